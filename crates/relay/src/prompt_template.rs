use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

pub type PromptError = TeraError;

/// Formatting instructions wrapped around every user question.
///
/// Clients render the answer as markdown, so the list, bold and heading
/// guidance here shapes what they display.
pub const STRUCTURED_ANSWER_TEMPLATE: &str = include_str!("prompts/structured_answer.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[derive(Serialize)]
struct StructuredAnswerContext<'a> {
    message: &'a str,
}

/// Embed the raw user message into the structured answer template.
pub fn structured_answer_prompt(message: &str) -> Result<String, PromptError> {
    load_prompt(STRUCTURED_ANSWER_TEMPLATE, &StructuredAnswerContext { message })
}
