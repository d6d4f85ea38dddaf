//! Submit a comment to a running site the way its article page does

use anyhow::Result;

use crate::page::{HttpCommentsApi, MergeStrategy, PageController, SubmitOutcome};

/// Comment values from the command line
pub struct SubmitArgs<'a> {
    pub server: &'a str,
    pub post_id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub comment: &'a str,
    pub strategy: MergeStrategy,
}

/// Mount, submit, and print the reconciled thread
pub async fn run(args: SubmitArgs<'_>) -> Result<SubmitOutcome> {
    let api = HttpCommentsApi::new(args.server)?;
    let mut controller = PageController::for_post(api, args.post_id, Vec::new(), args.strategy);
    controller.mount().await;

    let form = controller.form_mut();
    form.name = args.name.to_string();
    form.email = args.email.to_string();
    form.comment = args.comment.to_string();

    let outcome = controller.submit().await;
    match &outcome {
        SubmitOutcome::Invalid(missing) => {
            println!("Missing required fields: {}", missing.join(", "));
        }
        SubmitOutcome::Reconciled => println!("Comment submitted."),
        SubmitOutcome::WriteFailed => println!("Comment could not be submitted."),
        SubmitOutcome::RefetchFailed => println!("Comment submitted; refresh failed."),
    }

    println!("Comments ({}):", controller.thread().len());
    for comment in controller.thread().comments() {
        let marker = if comment.approved { " " } else { "*" };
        println!("  {} [{}] {}: {}", marker, comment.id, comment.name, comment.comment);
    }
    if controller.thread().pending().next().is_some() {
        println!("(* not yet approved)");
    }

    Ok(outcome)
}
