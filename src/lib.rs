// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper over these modules.
//
// Module responsibilities:
// - `api`: the blocking SONG REST client (upload, status, save,
//   publish) with bearer-token auth.
// - `config`: the dotfile holding the access token, server URL and
//   study ID, plus the interactive `configure` wizard.
// - `cli`: clap subcommands gluing the two together.
//
// Keeping the client free of process-exit side effects makes it easy
// to test against a mock server.
pub mod api;
pub mod cli;
pub mod config;
