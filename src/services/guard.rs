use crate::models::social::Platform;

/// Maximum hashtags a post may carry on any platform.
const MAX_HASHTAGS: usize = 30;

fn caption_limit(platform: Platform) -> usize {
    match platform {
        Platform::Instagram => 2200,
        Platform::Facebook => 5000,
        Platform::Tiktok => 2200,
    }
}

/// Outcome of a guard check. `passed` gates auto-publication.
#[derive(Debug, Clone)]
pub struct GuardVerdict {
    pub passed: bool,
    pub score: i32,
    pub violations: Vec<String>,
}

/// Rule-based gate run over generated text before it is persisted as a
/// scheduled post. Score starts at 100 and loses points per violation.
#[derive(Debug, Clone, Default)]
pub struct ContentGuard {
    banned_phrases: Vec<String>,
}

impl ContentGuard {
    pub fn new(banned_phrases: Vec<String>) -> Self {
        Self {
            banned_phrases: banned_phrases
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    pub fn check(&self, platform: Platform, content: &str, hashtags: &[String]) -> GuardVerdict {
        let mut violations = Vec::new();
        let mut score = 100i32;

        if content.trim().is_empty() {
            violations.push("el contenido está vacío".to_string());
            score -= 100;
        }

        let limit = caption_limit(platform);
        if content.chars().count() > limit {
            violations.push(format!(
                "el texto supera el límite de {limit} caracteres de {platform}"
            ));
            score -= 40;
        }

        if hashtags.len() > MAX_HASHTAGS {
            violations.push(format!("más de {MAX_HASHTAGS} hashtags"));
            score -= 20;
        }

        let lowered = content.to_lowercase();
        for phrase in &self.banned_phrases {
            if lowered.contains(phrase) {
                violations.push(format!("frase prohibida: \"{phrase}\""));
                score -= 30;
            }
        }

        GuardVerdict {
            passed: violations.is_empty(),
            score: score.max(0),
            violations,
        }
    }
}
