//! Personas and prompt composition.

use serde::{Deserialize, Serialize};

pub const SYSTEM_PREAMBLE: &str = "You are a friendly personal finance assistant. \
Give practical, general guidance on budgeting, saving and spending. \
You are not a licensed financial advisor and must not recommend specific investment products.";

pub const BULLET_INSTRUCTION: &str = "Answer using clear bullet points.";

pub const SAMPLE_INPUT: &str = "I earn 40000 a year, my rent is 12000, groceries cost about 4000 \
and transport 2000. I have no savings yet. How should I split my money so I can build an \
emergency fund?";

/// Tone variant injected into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    #[default]
    Student,
    Professional,
}

impl Persona {
    pub const ALL: [Persona; 2] = [Persona::Student, Persona::Professional];

    pub fn label(self) -> &'static str {
        match self {
            Persona::Student => "Student",
            Persona::Professional => "Professional",
        }
    }

    pub fn tone(self) -> &'static str {
        match self {
            Persona::Student => {
                "The user is a student: explain in simple words, avoid jargon and use small everyday examples."
            }
            Persona::Professional => {
                "The user is a working professional: be concise and precise, and focus on actionable numbers."
            }
        }
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "simple" => Ok(Persona::Student),
            "professional" | "concise" => Ok(Persona::Professional),
            other => Err(format!("unknown persona '{}'", other)),
        }
    }
}

/// preamble, tone, raw user input, bullet instruction; one per line.
pub fn compose_prompt(persona: Persona, user_input: &str) -> String {
    format!(
        "{}\n{}\n\nUser question:\n{}\n\n{}",
        SYSTEM_PREAMBLE,
        persona.tone(),
        user_input,
        BULLET_INSTRUCTION
    )
}
