use clap::{Parser, Subcommand};

use crate::models::generation::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::models::persona::Persona;

/// Budget Coach — budgeting tips from watsonx.ai
#[derive(Parser)]
#[command(name = "budget-coach", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the web page (default)
    Serve {
        /// Port to bind. Defaults to 8501.
        #[arg(short, long, env = "BUDGET_COACH_PORT")]
        port: Option<u16>,
    },

    /// Ask once from the terminal and print the answer
    Ask {
        /// student or professional
        #[arg(long, default_value = "student", value_parser = parse_persona)]
        persona: Persona,
        /// Token budget, 100-1200
        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
        /// 0.0-1.0
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f64,
        /// Use the built-in sample situation instead of INPUT
        #[arg(long, conflicts_with = "input")]
        sample: bool,
        /// Your financial situation and question
        input: Option<String>,
    },

    /// Only check that an access token can be obtained
    Check,
}

fn parse_persona(s: &str) -> Result<Persona, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_arguments() {
        let cli = Cli::try_parse_from([
            "budget-coach",
            "ask",
            "--persona",
            "professional",
            "--max-tokens",
            "600",
            "--temperature",
            "0.7",
            "I earn 40000",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Ask {
                persona,
                max_tokens,
                temperature,
                sample,
                input,
            }) => {
                assert_eq!(persona, Persona::Professional);
                assert_eq!(max_tokens, 600);
                assert_eq!(temperature, 0.7);
                assert!(!sample);
                assert_eq!(input.as_deref(), Some("I earn 40000"));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_sample_conflicts_with_input() {
        assert!(Cli::try_parse_from(["budget-coach", "ask", "--sample", "text"]).is_err());
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["budget-coach"]).unwrap();
        assert!(cli.command.is_none());
    }
}
