//! The support-assistant prompt.

/// Sentence the model is told to use when the context has no answer.
pub const FALLBACK_ANSWER: &str =
    "I'm not sure about that. You can reach out to our team for further help.";

/// Separator placed between retrieved documents in the context section.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Build the full prompt for one question.
///
/// `context` is the retrieved document texts in rank order; `question` is
/// inserted as received.
pub fn build_prompt(business_name: &str, context: &[&str], question: &str) -> String {
    format!(
        "\nYou are a friendly and knowledgeable customer support assistant for {business}.\n\
         Use the following context to answer customer queries as helpfully and politely as possible.\n\
         If the answer is not known or not found, say: '{fallback}'\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n",
        business = business_name,
        fallback = FALLBACK_ANSWER,
        context = context.join(CONTEXT_SEPARATOR),
        question = question,
    )
}

/// Remove a leading `answer:` label (any case) and surrounding whitespace.
///
/// Text without the label is returned unchanged.
pub fn strip_answer_prefix(text: &str) -> String {
    const PREFIX: &str = "answer:";
    match text.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => text[PREFIX.len()..].trim().to_string(),
        _ => text.to_string(),
    }
}
