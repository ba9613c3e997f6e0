//! Narration synthesis with espeak-ng.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Voice, rate and loudness for one synthesis call.
#[derive(Debug, Clone)]
pub struct SpeechParams {
    pub voice: Option<String>,
    /// Words per minute.
    pub rate: u32,
    pub amplitude: u32,
    pub timeout: Duration,
}

/// A voice the synthesis engine offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Voice {
    /// Identifier passed back as `selected_voice`.
    pub id: String,
    pub name: String,
    pub gender: Option<String>,
}

/// Speak `text` into a WAV file at `output`.
///
/// The text goes through stdin so it never needs shell or argument escaping.
/// A zero-length result is reported as a tool failure.
pub async fn synthesize_speech(
    tools: &ToolRegistry,
    text: &str,
    params: &SpeechParams,
    output: &Path,
) -> sc_core::Result<()> {
    let espeak = tools.require("espeak-ng")?;

    let mut cmd = ToolCommand::new(espeak.path.clone());
    cmd.arg("-w").arg(output.to_string_lossy().as_ref());
    cmd.arg("-s").arg(params.rate.to_string());
    cmd.arg("-a").arg(params.amplitude.min(200).to_string());
    if let Some(ref voice) = params.voice {
        cmd.arg("-v").arg(voice.as_str());
    }
    cmd.arg("--stdin");
    cmd.stdin(text.as_bytes().to_vec());
    cmd.timeout(params.timeout);
    cmd.execute().await?;

    if !sc_core::is_present(output) {
        return Err(sc_core::Error::tool(
            "espeak-ng",
            format!("no audio written to {}", output.display()),
        ));
    }
    Ok(())
}

/// List the voices espeak-ng knows about.
pub async fn list_voices(tools: &ToolRegistry) -> sc_core::Result<Vec<Voice>> {
    let espeak = tools.require("espeak-ng")?;
    let output = ToolCommand::new(espeak.path.clone())
        .arg("--voices")
        .timeout(Duration::from_secs(10))
        .execute()
        .await?;
    Ok(parse_voices(&output.stdout))
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File          Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US     (en 3)
/// ```
pub fn parse_voices(table: &str) -> Vec<Voice> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 {
                return None;
            }
            let gender = cols[2]
                .split('/')
                .nth(1)
                .filter(|g| !g.is_empty() && *g != "-")
                .map(str::to_string);
            Some(Voice {
                id: cols[1].to_string(),
                name: cols[3].replace('_', " "),
                gender,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_voice_table() {
        let table = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-us           --/F      English_(America)  gmw/en-US            (en 3)
";
        let voices = parse_voices(table);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, "en-us");
        assert_eq!(voices[1].name, "English (America)");
        assert_eq!(voices[1].gender.as_deref(), Some("F"));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_voices("Pty Language Age/Gender VoiceName File\n").is_empty());
        assert!(parse_voices("").is_empty());
    }

    #[tokio::test]
    async fn missing_engine_is_a_tool_error() {
        let tools = ToolRegistry::default();
        let params = SpeechParams {
            voice: None,
            rate: 150,
            amplitude: 180,
            timeout: Duration::from_secs(1),
        };
        let err = synthesize_speech(&tools, "hello", &params, Path::new("/tmp/x.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, sc_core::Error::Tool { .. }));
    }
}
