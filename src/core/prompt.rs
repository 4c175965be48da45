//! Prompt assembly

use crate::conversation::Message;

/// Build the message list sent upstream: one system message, then `prior`
/// exactly as given.
///
/// Callers window the history and validate the user input beforehand.
pub fn assemble(system_prompt: &str, prior: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(prior.len() + 1);
    messages.push(Message::system(system_prompt));
    messages.extend_from_slice(prior);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_prepends_single_system_message() {
        let prior = vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ];

        let messages = assemble("system text", &prior);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::system("system text"));
        assert_eq!(&messages[1..], prior.as_slice());
        assert_eq!(
            messages.iter().filter(|m| m.role == Role::System).count(),
            1
        );
    }

    #[test]
    fn test_empty_prior() {
        let messages = assemble("only system", &[]);
        assert_eq!(messages, vec![Message::system("only system")]);
    }
}
