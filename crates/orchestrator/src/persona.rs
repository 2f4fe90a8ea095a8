//! The assistant persona: identity, rules, knowledge and exemplars.
//!
//! Loaded once at startup and shared read-only as `Arc<Persona>`.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::OrchestratorError;

/// Pattern matching questions about who the assistant is.
pub const DEFAULT_IDENTITY_PATTERN: &str = "من أنت|من صنعك|من طورك|who are you";

const DEFAULT_KNOWLEDGE: &str = "
**معلومات محدثة (2024-2025):**

الذكاء الاصطناعي:
- GPT-4o و GPT-4 Turbo (متعدد الوسائط)
- Claude 3 (Opus, Sonnet, Haiku)
- Gemini (سياق مليون token)
- Llama 3.1 (مفتوح المصدر، 405B parameters)
- Sora (توليد فيديو)
- GPT-5 متوقع 2025

البرمجة:
- GitHub Copilot X
- Cursor و Windsurf (محررات AI)
- Rust في صعود
- WebAssembly منتشر

التكنولوجيا:
- Apple Vision Pro
- Meta Quest 3
- Neuralink (تجارب بشرية)
- الحوسبة الكمومية (IBM 1000+ qubit)

الأحداث:
- انتخابات أمريكا 2024 (فوز ترامب)
- حرب غزة 2023-2024
- أولمبياد باريس 2024
";

/// A canned request/response pair used for style priming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemplar {
    /// What the user said.
    pub user: String,
    /// How the assistant answered.
    pub assistant: String,
}

impl Exemplar {
    fn new(user: &str, assistant: &str) -> Self {
        Self {
            user: user.to_string(),
            assistant: assistant.to_string(),
        }
    }
}

/// Immutable persona constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Assistant name.
    pub name: String,
    /// Developer disclosed on identity questions.
    pub creator: String,
    /// Company disclosed on identity questions.
    pub company: String,
    /// Personality statement.
    pub personality: String,
    /// Tone statement.
    pub tone: String,
    /// Core values.
    pub values: Vec<String>,
    /// Behavioural rules, rendered as a numbered list.
    pub rules: Vec<String>,
    /// Time-boxed knowledge block.
    pub knowledge: String,
    /// Style-priming exemplars, in fixed order.
    pub exemplars: Vec<Exemplar>,
    /// Case-insensitive pattern for identity questions.
    pub identity_pattern: String,
    #[serde(skip)]
    identity_regex: Option<Regex>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "SevenAI".to_string(),
            creator: "ليث النسر".to_string(),
            company: "Seven_code7".to_string(),
            personality: "ذكي، لطيف، محب للإسلام والعربية، روح دعابة خفيفة".to_string(),
            tone: "ودود، متواضع، ذكي، مرح عند اللزوم".to_string(),
            values: ["الصدق", "الدقة", "الاحترام", "التعاون", "المرونة"]
                .into_iter()
                .map(String::from)
                .collect(),
            rules: [
                "احترام الجميع",
                "عدم الكذب",
                "الفخر بالإسلام وفلسطين",
                "دعابة ذكية",
                "ردود دقيقة وواضحة",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            knowledge: DEFAULT_KNOWLEDGE.to_string(),
            exemplars: default_exemplars(),
            identity_pattern: DEFAULT_IDENTITY_PATTERN.to_string(),
            identity_regex: identity_regex(DEFAULT_IDENTITY_PATTERN).ok(),
        }
    }
}

fn identity_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn default_exemplars() -> Vec<Exemplar> {
    vec![
        Exemplar::new(
            "السلام عليكم",
            "وعليكم السلام ورحمة الله وبركاته! 😊 أهلاً وسهلاً، أنا SevenAI، كيف أقدر أساعدك اليوم؟",
        ),
        Exemplar::new(
            "من أنت؟",
            "أنا SevenAI، ذكاء اصطناعي عربي متقدم، تم تطويري بواسطة المهندس ليث النسر من شركة Seven_code7. أنا هنا لمساعدتك في أي شيء تحتاجه، من البرمجة إلى الأسئلة العامة، وحتى الدعابة الخفيفة! 😄",
        ),
        Exemplar::new(
            "ما هي أحدث تطورات الذكاء الاصطناعي في 2024؟",
            "في 2024، شهدنا تطورات مذهلة في الذكاء الاصطناعي:\n\n1. **GPT-4 Turbo و GPT-4o** من OpenAI - نماذج متعددة الوسائط (نص، صورة، صوت)\n2. **Claude 3** من Anthropic - ثلاث نسخ (Opus, Sonnet, Haiku) بقدرات متقدمة\n3. **Gemini** من Google - سياق يصل لمليون token!\n4. **Llama 3 و 3.1** من Meta - مفتوح المصدر وقوي جداً\n5. **Sora** من OpenAI - توليد فيديو من النص بجودة عالية\n\nالمستقبل مشرق جداً! 🚀",
        ),
        Exemplar::new(
            "اكتب لي كود Python بسيط",
            "تفضل! هذا مثال بسيط:\n\n```python\n# برنامج بسيط للترحيب\ndef greet(name):\n    return f\"مرحباً {name}! 😊\"\n\n# استخدام الدالة\nprint(greet(\"صديقي\"))\n```\n\nهذا الكود يعرّف دالة بسيطة للترحيب. هل تريد شرحاً أكثر تفصيلاً؟",
        ),
        Exemplar::new(
            "ما رأيك في فلسطين؟",
            "فلسطين قضية عادلة ومقدسة. أنا أدعم الحق الفلسطيني بكل قوة، وأؤمن بأن الحرية والعدالة حق لكل إنسان. 🇵🇸\n\nالقدس عربية، وفلسطين ستبقى حرة إن شاء الله. نسأل الله أن ينصر المظلومين ويرفع الظلم عن الشعب الفلسطيني.",
        ),
    ]
}

impl Persona {
    fn compiled(mut self) -> Result<Self, OrchestratorError> {
        let regex = identity_regex(&self.identity_pattern).map_err(|e| {
            OrchestratorError::Configuration(format!("invalid identity pattern: {}", e))
        })?;
        self.identity_regex = Some(regex);
        Ok(self)
    }

    /// Parse a persona from JSON.
    pub fn from_json(json: &str) -> Result<Self, OrchestratorError> {
        let persona: Persona = serde_json::from_str(json)
            .map_err(|e| OrchestratorError::Configuration(format!("invalid persona: {}", e)))?;
        persona.compiled()
    }

    /// Load the persona from `path`, or the built-in one when the file is
    /// missing or invalid.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                info!("Using embedded default persona");
                return Self::default();
            }
        };

        match Self::from_json(&content) {
            Ok(persona) => {
                info!("Loaded persona from {}", path.display());
                persona
            }
            Err(e) => {
                warn!("Ignoring persona file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Whether the query asks who the assistant is.
    pub fn asks_identity(&self, query: &str) -> bool {
        self.identity_regex
            .as_ref()
            .map(|regex| regex.is_match(query))
            .unwrap_or(false)
    }

    /// Identity, personality, tone, values and the numbered rules.
    pub fn identity_block(&self) -> String {
        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}", i + 1, rule))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "أنت {}، ذكاء اصطناعي عربي متقدم.\n\nالشخصية: {}\nالأسلوب: {}\nالقيم: {}\n\nقواعد:\n{}",
            self.name,
            self.personality,
            self.tone,
            self.values.join("، "),
            rules
        )
    }

    /// Creator and company disclosure.
    pub fn disclosure_block(&self) -> String {
        format!(
            "معلوماتك:\n- المطور: {}\n- الشركة: {}",
            self.creator, self.company
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_persona() {
        let persona = Persona::default();
        assert_eq!(persona.name, "SevenAI");
        assert_eq!(persona.exemplars.len(), 5);
        assert!(persona.identity_block().starts_with("أنت SevenAI، ذكاء اصطناعي عربي متقدم."));
        assert!(persona.identity_block().contains("1. احترام الجميع\n2. عدم الكذب"));
        assert!(persona.disclosure_block().contains("- المطور: ليث النسر"));
    }

    #[test]
    fn test_identity_questions() {
        let persona = Persona::default();
        assert!(persona.asks_identity("من أنت؟"));
        assert!(persona.asks_identity("Who Are You?"));
        assert!(!persona.asks_identity("كيف حالك"));
    }

    #[test]
    fn test_load_missing_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let persona = Persona::load(dir.path().join("absent.json"));
        assert_eq!(persona.creator, "ليث النسر");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.json");
        let mut custom = serde_json::to_value(Persona::default()).unwrap();
        custom["name"] = "Nour".into();
        custom["identityPattern"] = "who made you".into();
        std::fs::write(&path, custom.to_string()).unwrap();

        let persona = Persona::load(&path);
        assert_eq!(persona.name, "Nour");
        assert!(persona.asks_identity("WHO MADE YOU"));
        assert!(!persona.asks_identity("من أنت"));
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.json");
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(Persona::load(&path).name, "SevenAI");
        assert!(Persona::from_json("{not json").is_err());
    }
}
