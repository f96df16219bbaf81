use question::{Answer, Question};

pub fn confirm(prompt: &str, default: Option<Answer>) -> bool {
    let mut question = Question::new(prompt);
    question.yes_no().until_acceptable().show_defaults();
    if let Some(default) = default {
        question.default(default);
    }
    question.confirm() == Answer::YES
}
