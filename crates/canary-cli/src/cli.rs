// canary-cli/src/cli.rs
// ============================================================================
// Module: CLI Flags
// Description: The flat flag set spec.md §6 enumerates, parsed with clap's
//              derive API.
// Purpose: Give `main` one typed `Cli` value; every flag's effect on
//          behavior is wired in `driver`, not here.
// Dependencies: clap
// ============================================================================

//! ## Overview
//! spec.md's CLI is a single invocation with many independent flags, not a
//! subcommand tree, so this mirrors that shape directly rather than
//! imposing subcommands the spec never asked for. Argument parsing and
//! generated `--help` text are accepted as clap produces them (spec.md §1
//! lists "CLI argument parsing and help output" as an external
//! collaborator).

use clap::Parser;

/// `canary-harness` — canary harness driver (spec.md §2, §6).
#[derive(Debug, Parser)]
#[command(name = "canary-harness", disable_version_flag = true)]
pub struct Cli {
    /// Run the full combinatorial canary pool.
    #[arg(long)]
    pub matrix: bool,
    /// Run the smaller, curated canary pool.
    #[arg(long)]
    pub targeted: bool,
    /// Run the single baseline canary.
    #[arg(long)]
    pub canonical: bool,
    /// Execution mode: `e2e` (alias `end-to-end`) or `component`.
    #[arg(long, default_value = "component")]
    pub mode: String,
    /// Comma-separated list of canary ids to restrict the selected pool to.
    #[arg(long, value_name = "IDS")]
    pub only: Option<String>,
    /// Run preflight only, then exit successfully.
    #[arg(long)]
    pub preflight_only: bool,
    /// List every personality and inclusivity trait in the canonical
    /// dictionary, then exit.
    #[arg(long)]
    pub list_traits: bool,
    /// List every canonical domain and its entries, then exit.
    #[arg(long)]
    pub list_enums: bool,
    /// Resolve a single free-form token against every canonical domain and
    /// print the result, then exit.
    #[arg(long, value_name = "VALUE")]
    pub resolve: Option<String>,
    /// Upgrade species-truthiness and nonhuman-drift-after-edit soft issues
    /// to hard failures (spec.md §4.6, glossary "Soft issue").
    #[arg(long, alias = "strict-mode")]
    pub strict: bool,
    /// Canary-user email override, used as the config resolver's last
    /// fallback (spec.md §4.4 step 4).
    #[arg(long, value_name = "EMAIL")]
    pub canary_email: Option<String>,
    /// Canary-user password override, used as the config resolver's last
    /// fallback (spec.md §4.4 step 4).
    #[arg(long, value_name = "PASSWORD")]
    pub canary_password: Option<String>,
    /// Skip preflight step 7 (login + `/auth/me` + token classification).
    #[arg(long)]
    pub skip_auth_preflight: bool,
    /// Explicit operator confirmation required to run against a production
    /// API host (spec.md §4.3).
    #[arg(long)]
    pub confirm_production: bool,
    /// Explicitly request canary-user provisioning/reset (spec.md §4.4
    /// step 5).
    #[arg(long)]
    pub ensure_canary_user: bool,
    /// Allow `--ensure-canary-user` to run against production, alongside
    /// `--confirm-production` (spec.md §4.3).
    #[arg(long)]
    pub allow_prod_ensure_user: bool,
    /// Force the public asset host allowlist down to a single synthetic
    /// host, for negative-path testing (spec.md §8 scenario 3).
    #[arg(long)]
    pub force_bad_host: bool,
    /// Explicit deployment environment (`staging` or `production`),
    /// overriding inference from the API host (spec.md §4.3).
    #[arg(long, value_name = "ENV")]
    pub env: Option<String>,
    /// Write resolved values back to the parameter store when they came
    /// from env or fallback (spec.md §6; see `DESIGN.md` for the resolved
    /// Open Question on this flag's effect).
    #[arg(long)]
    pub persist_ssm: bool,
}

impl Cli {
    /// Parses `--only` into a list of canary ids, if given.
    #[must_use]
    pub fn only_ids(&self) -> Option<Vec<String>> {
        self.only.as_ref().map(|csv| csv.split(',').map(str::trim).filter(|id| !id.is_empty()).map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_splits_and_trims_csv() {
        let cli = Cli::parse_from(["canary-harness", "--only", "a, b ,c"]);
        assert_eq!(cli.only_ids(), Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
    }

    #[test]
    fn only_absent_is_none() {
        let cli = Cli::parse_from(["canary-harness"]);
        assert_eq!(cli.only_ids(), None);
    }

    #[test]
    fn strict_mode_alias_parses() {
        let cli = Cli::parse_from(["canary-harness", "--strict-mode"]);
        assert!(cli.strict);
    }

    #[test]
    fn mode_defaults_to_component() {
        let cli = Cli::parse_from(["canary-harness"]);
        assert_eq!(cli.mode, "component");
    }
}
