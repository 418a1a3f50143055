/*!
 * Journal entry analysis.
 *
 * - `emotion`: classifier output normalization, emotional state and risk
 * - `fallback`: keyword heuristic used when no classifier answers
 * - `trends`: insights over a session's entries
 * - `prompts`: prompt text for the supportive assistant
 * - `responder`: supportive reply generation and post-processing
 */

pub mod emotion;
pub mod fallback;
pub mod prompts;
pub mod responder;
pub mod trends;

pub use emotion::{EmotionAnalysis, EmotionDetector, EmotionScore, RiskLevel, Sentiment};
pub use responder::{ResponseGenerator, SupportResponse};
pub use trends::{EmotionTrend, TrendReport};
