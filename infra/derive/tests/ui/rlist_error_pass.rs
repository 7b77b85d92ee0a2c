use rlist_derive::rlist_error;
use std::borrow::Cow;

#[rlist_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing entry{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<Vec<u8>, DemoError> {
    std::fs::read("/definitely/not/here").context("reading demo file")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.variant(), "Io");

    let internal: DemoError = "boom".into();
    assert_eq!(internal.variant(), "Internal");
}
