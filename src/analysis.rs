//! Prompt critique workflow
//!
//! [`PromptAnalyzer::analyze`] produces the detailed report alone.
//! [`PromptAnalyzer::dual_analyze`] computes [`PromptMetrics`] once, then
//! spawns a quick and a detailed branch. The detailed branch runs the
//! same code as `analyze`. The join returns on the first error; the
//! sibling task is left to finish on its own and its outcome dropped.

use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use crate::error::{Error, Result};
use crate::gateway::ChatGenerator;
use crate::{DualAnalysisResult, Message};

/// Model used when the caller passes an empty model id
pub const DEFAULT_ANALYSIS_MODEL: &str = "gpt-4.1";

const DETAILED_TEMPERATURE: f32 = 0.7;
const DETAILED_MAX_TOKENS: i64 = 2000;
const QUICK_TEMPERATURE: f32 = 0.5;
const QUICK_MAX_TOKENS: i64 = 500;

const NO_SPECIAL_CHARACTERS: &str = "None detected";

const DETAILED_SYSTEM_PROMPT: &str = r#"Act as an expert prompt engineer. Analyze the prompt you are given and explain its structure, its content, and any issue that could affect a model's response.

Start with the length of the prompt (tokens, characters and words), the special characters it uses, and any phrasing or wording problems. Describe how a model is likely to understand the prompt and any bias or limitation that may show up in its answer.

Task Definition: break the prompt down into its task, subtasks and objectives.

Contextual Relevance: judge how well the prompt fits its context, naming the links to that context and how strong each one is.

Structure Analysis: describe how the prompt is composed and organized.

Evaluation Criteria: assess how effectively the prompt achieves its purpose, stating the criteria you applied (clarity, specificity, relevance, coherence, or others that matter here).

Audience Analysis: assess whether the prompt suits its audience, considering language complexity and technical jargon.

Language Analysis: evaluate grammar, vocabulary and style, their likely effect on the response, and any cultural or regional bias.

Record any problem you hit while analyzing and recommend how to address it.

Format the whole response as valid HTML, never markdown:
- <h2> for major sections, <h3> for subsections
- <p> for paragraphs, <ul>/<ol> with <li> for lists
- <strong> and <em> for emphasis
- <div class="analysis-section"> to group a section
- <div class="metrics"> for statistics
- <div class="recommendation"> for suggestions

Close with a narrated summary of strengths, weaknesses and recommendations. Begin directly with HTML, without any preamble."#;

const QUICK_SYSTEM_PROMPT: &str = r#"You are a prompt analysis expert. Give a QUICK, SUCCINCT analysis of the prompt.

Cover only:
1. Overall Quality Score (1-10)
2. Key Strengths (2-3 points)
3. Critical Issues (2-3 points)
4. Essential Fixes (2-3 points)

Format the response as valid HTML only:
- <div class="quick-analysis"> as the main container
- <div class="score">Score: X/10</div>
- <div class="strengths"><strong>Strengths:</strong> list</div>
- <div class="issues"><strong>Issues:</strong> list</div>
- <div class="fixes"><strong>Essential Fixes:</strong> list</div>
- <ul><li> for bullet points, <strong> for emphasis

Stay under 200 words."#;

/// Basic facts about a prompt, shared by both critique branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMetrics
{   /// UTF-8 byte length
    pub character_count: usize
  , pub word_count: usize
  , pub line_count: usize
  , /// Distinct punctuation and symbol characters, first-seen order
    pub special_characters: Vec<char>
}

impl PromptMetrics
{   pub fn compute(prompt: &str) -> Self
    {   let mut special_characters = Vec::new();
        for c in prompt.chars()
        {   if is_special(c) && !special_characters.contains(&c)
            {   special_characters.push(c);
            }
        }

        PromptMetrics
        {   character_count: prompt.len()
          , word_count: prompt.split_whitespace().count()
          , line_count: prompt.split('\n').count()
          , special_characters
        }
    }

    /// Comma-separated special characters, or "None detected"
    pub fn special_characters_label(&self) -> String
    {   if self.special_characters.is_empty()
        {   return NO_SPECIAL_CHARACTERS.to_string();
        }
        self.special_characters
          .iter()
          .map(char::to_string)
          .collect::<Vec<_>>()
          .join(", ")
    }
}

/// Punctuation or symbol by Unicode general category
fn is_special(c: char) -> bool
{   matches!(
      c.general_category_group(),
      GeneralCategoryGroup::Punctuation | GeneralCategoryGroup::Symbol
    )
}

/// Messages for the exhaustive critique
pub fn detailed_messages(prompt: &str, metrics: &PromptMetrics) -> Vec<Message>
{   let user = format!(
      "Please analyze this prompt with the following basic metrics:\n\n\
       PROMPT METRICS:\n\
       - Characters: {}\n\
       - Words: {}\n\
       - Lines: {}\n\
       - Special Characters: {}\n\n\
       PROMPT TO ANALYZE:\n{}",
      metrics.character_count,
      metrics.word_count,
      metrics.line_count,
      metrics.special_characters_label(),
      prompt
    );
    vec![Message::system(DETAILED_SYSTEM_PROMPT), Message::user(user)]
}

/// Messages for the short scored critique
pub fn quick_messages(prompt: &str, metrics: &PromptMetrics) -> Vec<Message>
{   let user = format!(
      "Analyze this prompt quickly:\n\n\
       METRICS: {} chars, {} words, {} lines\n\
       PROMPT: {}",
      metrics.character_count,
      metrics.word_count,
      metrics.line_count,
      prompt
    );
    vec![Message::system(QUICK_SYSTEM_PROMPT), Message::user(user)]
}

fn resolve_model(model: &str) -> String
{   if model.is_empty()
    {   DEFAULT_ANALYSIS_MODEL.to_string()
    } else
    {   model.to_string()
    }
}

#[derive(Clone)]
pub struct PromptAnalyzer
{   generator: Arc<dyn ChatGenerator>
}

impl PromptAnalyzer
{   pub fn new(generator: Arc<dyn ChatGenerator>) -> Self
    {   PromptAnalyzer { generator }
    }

    /// Detailed critique of one prompt
    pub async fn analyze(&self, prompt: &str, model: &str) -> Result<String>
    {   let metrics = PromptMetrics::compute(prompt);
        self.detailed_report(prompt, &metrics, &resolve_model(model))
          .await
    }

    async fn detailed_report(
      &self
    , prompt: &str
    , metrics: &PromptMetrics
    , model: &str
    ) -> Result<String>
    {   debug!("Requesting detailed analysis with model: {}", model);
        self.generator
          .generate_text(
            detailed_messages(prompt, metrics),
            DETAILED_TEMPERATURE,
            DETAILED_MAX_TOKENS,
            model
          )
          .await
    }

    async fn quick_report(
      &self
    , prompt: &str
    , metrics: &PromptMetrics
    , model: &str
    ) -> Result<String>
    {   debug!("Requesting quick analysis with model: {}", model);
        self.generator
          .generate_text(
            quick_messages(prompt, metrics),
            QUICK_TEMPERATURE,
            QUICK_MAX_TOKENS,
            model
          )
          .await
    }

    /// Quick and detailed critiques, generated concurrently.
    /// Either both reports come back or the first error does.
    pub async fn dual_analyze(
      &self
    , prompt: &str
    , model: &str
    ) -> Result<DualAnalysisResult>
    {   let model = resolve_model(model);
        let metrics = Arc::new(PromptMetrics::compute(prompt));
        let prompt: Arc<str> = Arc::from(prompt);
        trace!("Dual analysis metrics: {:?}", metrics);

        let (quick_tx, mut quick_rx) = mpsc::unbounded_channel();
        let (detailed_tx, mut detailed_rx) = mpsc::unbounded_channel();

        {   let analyzer = self.clone();
            let (prompt, metrics, model)
              = (prompt.clone(), metrics.clone(), model.clone());
            tokio::spawn(async move {
              let report = analyzer
                .quick_report(&prompt, &metrics, &model)
                .await;
              let _ = quick_tx.send(report);
            });
        }
        {   let analyzer = self.clone();
            let (prompt, metrics, model)
              = (prompt.clone(), metrics.clone(), model.clone());
            tokio::spawn(async move {
              let report = analyzer
                .detailed_report(&prompt, &metrics, &model)
                .await;
              let _ = detailed_tx.send(report);
            });
        }
        debug!("Dispatched quick and detailed analysis for model: {}", model);

        let mut quick_report: Option<String> = None;
        let mut detailed_report: Option<String> = None;

        loop
        { if let (Some(quick), Some(detailed))
            = (&quick_report, &detailed_report)
          {   return Ok(DualAnalysisResult
              {   quick_report: quick.clone()
                , detailed_report: detailed.clone()
              });
          }

          tokio::select!
          { Some(report) = quick_rx.recv(), if quick_report.is_none() => {
              match report
              {   Ok(text) => {
                    debug!("Quick analysis joined");
                    quick_report = Some(text);
                  }
                , Err(e) => {
                    debug!("Quick analysis failed, abandoning join");
                    return Err(Error::Analysis
                    {   branch: "quick"
                      , source: Box::new(e)
                    });
                  }
              }
            }
          , Some(report) = detailed_rx.recv(), if detailed_report.is_none() => {
              match report
              {   Ok(text) => {
                    debug!("Detailed analysis joined");
                    detailed_report = Some(text);
                  }
                , Err(e) => {
                    debug!("Detailed analysis failed, abandoning join");
                    return Err(Error::Analysis
                    {   branch: "detailed"
                      , source: Box::new(e)
                    });
                  }
              }
            }
          , else => {
              let branch = if quick_report.is_none()
              {   "quick"
              } else
              {   "detailed"
              };
              return Err(Error::BranchAborted(branch));
            }
          }
        }
    }
}
