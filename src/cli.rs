//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Download and organize Bundestag plenary protocols.
///
/// Crawls the Bundestag Open Data page and downloads all Plenarprotokoll
/// XML/ZIP files into a directory tree partitioned by Wahlperiode. Files
/// already present are skipped, so re-running resumes where the last run
/// left off. The target URL, download directory, and request delay are
/// fixed.
#[derive(Parser, Debug)]
#[command(name = "btscrape")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["btscrape"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["btscrape", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["btscrape", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag() {
        let args = Args::try_parse_from(["btscrape", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Args::try_parse_from(["btscrape", "--output-dir", "x"]).is_err());
    }
}
