//! Reflection analysis collaborator.
//!
//! An analyzer receives already-decrypted text on explicit user request and
//! returns a structured result. It sits outside the crypto core: a failing or
//! unavailable analyzer never affects sealing or opening.
//!
//! No network client ships with this crate. [`CommandAnalyzer`] hands the
//! prompt to a local program; other implementors provide
//! [`ReflectionAnalyzer`] and can reuse [`build_prompt`] and [`parse_response`].

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::{RemnantError, Result};

const DEFAULT_SUMMARY: &str = "Unable to summarize.";
const DEFAULT_LESSON: &str = "No lesson extracted.";

fn default_summary() -> String {
    DEFAULT_SUMMARY.to_string()
}

fn default_lesson() -> String {
    DEFAULT_LESSON.to_string()
}

/// Structured insight returned for a reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionResult {
    /// One-sentence summary of the emotional tone
    #[serde(default = "default_summary")]
    pub summary: String,

    /// Open-ended follow-up questions
    #[serde(default)]
    pub questions: Vec<String>,

    /// One constructive lesson or pattern
    #[serde(default = "default_lesson")]
    pub lesson: String,
}

/// Something that can turn reflection text into a [`ReflectionResult`].
pub trait ReflectionAnalyzer {
    fn analyze(&self, text: &str) -> Result<ReflectionResult>;
}

/// Instruction framing sent ahead of the prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are an empathetic, private relationship counselor and archivist. \
Your goal is to help the user find closure, understanding, and emotional balance. \
Analyze the user's reflection about a relationship. \
Provide a response in strict JSON format.";

/// Build the analysis prompt for `text`.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze this text: {}\n\n\
         Output JSON with these keys:\n\
         1. \"summary\": A 1-sentence summary of the emotional tone.\n\
         2. \"questions\": An array of 2 deep, open-ended questions to help the user dig deeper.\n\
         3. \"lesson\": One constructive lesson or pattern identified.\n\n\
         Do not include markdown formatting. Just the raw JSON string.",
        serde_json::Value::String(text.to_string())
    )
}

/// Parse an analyzer response body.
///
/// Tolerates a surrounding markdown code fence and fills missing keys with
/// defaults. Anything that is not a JSON object is an `Analysis` error.
pub fn parse_response(body: &str) -> Result<ReflectionResult> {
    let trimmed = strip_code_fence(body.trim());
    if trimmed.is_empty() {
        return Err(RemnantError::Analysis("Empty response".to_string()));
    }
    serde_json::from_str(trimmed)
        .map_err(|e| RemnantError::Analysis(format!("Malformed response: {}", e)))
}

/// Runs an external program as the analyzer.
///
/// The program reads the instruction and prompt on stdin and prints the JSON
/// response on stdout. A non-zero exit is an `Analysis` error.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv-style list, `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ReflectionAnalyzer for CommandAnalyzer {
    fn analyze(&self, text: &str) -> Result<ReflectionResult> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RemnantError::Analysis(format!("Failed to start {}: {}", self.program, e))
            })?;

        let input = format!("{}\n\n{}", SYSTEM_INSTRUCTION, build_prompt(text));
        if let Some(mut stdin) = child.stdin.take() {
            // A program may answer without reading its input.
            match stdin.write_all(input.as_bytes()) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(RemnantError::Analysis(format!(
                        "Failed to send prompt to {}: {}",
                        self.program, e
                    )))
                }
            }
        }

        let output = child.wait_with_output().map_err(|e| {
            RemnantError::Analysis(format!("Failed to wait for {}: {}", self.program, e))
        })?;
        if !output.status.success() {
            tracing::debug!(program = %self.program, status = %output.status, "analyzer failed");
            return Err(RemnantError::Analysis(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let body = String::from_utf8(output.stdout)
            .map_err(|_| RemnantError::Analysis("Response is not UTF-8".to_string()))?;
        parse_response(&body)
    }
}

fn strip_code_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedAnalyzer(&'static str);

    impl ReflectionAnalyzer for CannedAnalyzer {
        fn analyze(&self, _text: &str) -> Result<ReflectionResult> {
            parse_response(self.0)
        }
    }

    #[test]
    fn test_parse_full_response() {
        let result = parse_response(
            r#"{"summary":"Bittersweet.","questions":["Why?","What now?"],"lesson":"Let go."}"#,
        )
        .unwrap();
        assert_eq!(result.summary, "Bittersweet.");
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.lesson, "Let go.");
    }

    #[test]
    fn test_parse_fills_defaults() {
        let result = parse_response("{}").unwrap();
        assert_eq!(result.summary, DEFAULT_SUMMARY);
        assert!(result.questions.is_empty());
        assert_eq!(result.lesson, DEFAULT_LESSON);
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let body = "```json\n{\"summary\":\"Calm.\"}\n```";
        assert_eq!(parse_response(body).unwrap().summary, "Calm.");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_response("sorry, I can't"),
            Err(RemnantError::Analysis(_))
        ));
        assert!(matches!(parse_response("  "), Err(RemnantError::Analysis(_))));
    }

    #[test]
    fn test_prompt_quotes_text() {
        let prompt = build_prompt("he said \"goodbye\"");
        assert!(prompt.contains(r#""he said \"goodbye\"""#));
        assert!(prompt.contains("\"questions\""));
    }

    fn shell(script: &str) -> CommandAnalyzer {
        CommandAnalyzer::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[cfg(unix)]
    #[test]
    fn test_command_analyzer_parses_stdout() {
        let analyzer = shell(
            r#"cat >/dev/null; printf '{"summary":"Calm.","questions":["Why?"],"lesson":"Rest."}'"#,
        );
        let result = analyzer.analyze("it ended gently").unwrap();
        assert_eq!(result.summary, "Calm.");
        assert_eq!(result.questions, vec!["Why?".to_string()]);
        assert_eq!(result.lesson, "Rest.");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_analyzer_receives_prompt() {
        // Summary reports whether the text reached the program.
        let analyzer = shell(
            r#"if grep -q 'quiet harbor'; then printf '{"summary":"seen"}'; else printf '{}'; fi"#,
        );
        let result = analyzer.analyze("a quiet harbor").unwrap();
        assert_eq!(result.summary, "seen");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_analyzer_failure_is_analysis_error() {
        let analyzer = shell("cat >/dev/null; exit 7");
        assert!(matches!(
            analyzer.analyze("text"),
            Err(RemnantError::Analysis(_))
        ));

        let garbage = shell("cat >/dev/null; echo not json");
        assert!(matches!(
            garbage.analyze("text"),
            Err(RemnantError::Analysis(_))
        ));
    }

    #[test]
    fn test_missing_program_is_analysis_error() {
        let analyzer = CommandAnalyzer::new("remnant-no-such-analyzer", Vec::new());
        assert!(matches!(
            analyzer.analyze("text"),
            Err(RemnantError::Analysis(_))
        ));
    }

    #[test]
    fn test_from_argv() {
        assert!(CommandAnalyzer::from_argv(&[]).is_none());
        let argv = vec!["llm".to_string(), "--json".to_string()];
        let analyzer = CommandAnalyzer::from_argv(&argv).unwrap();
        assert_eq!(analyzer.program(), "llm");
        assert_eq!(analyzer.args, vec!["--json".to_string()]);
    }

    #[test]
    fn test_analyzer_trait() {
        let analyzer = CannedAnalyzer(r#"{"lesson":"Boundaries matter."}"#);
        let result = analyzer.analyze("text").unwrap();
        assert_eq!(result.lesson, "Boundaries matter.");
    }
}
