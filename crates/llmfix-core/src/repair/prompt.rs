//! Prompt for declaration repairs

use crate::types::ChatMessage;

const SYSTEM_PROMPT: &str = "You are a Java compiler assistant. You fix a single variable \
declaration that fails to compile. Answer with one JSON object and nothing else, in the form \
{\"imports\": [\"fully.qualified.Type\"], \"variableContent\": \"expression\"}. \
`imports` lists the fully qualified names the fixed declaration needs (use an empty array when \
none are required). `variableContent` is the new right-hand side of the declaration only, \
without the type, the variable name, the `=` sign or a trailing semicolon.";

pub fn repair_messages(declaration: &str, diagnostic: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Declaration:\n{}\n\nCompiler error:\n{}",
            declaration, diagnostic
        )),
    ]
}
