#![cfg(feature = "sendmail-transport")]

use std::{
    sync::{mpsc, Arc},
    time::Duration,
};

use mailforge::{transport::sendmail::SendmailTransport, Mailer, Message};

#[test]
fn missing_binary_surfaces_as_transport_error() {
    let mut mailer = Mailer::new();
    mailer.register(Arc::new(SendmailTransport::new_with_command(
        "/definitely/not/a/sendmail",
    )));

    let (tx, rx) = mpsc::channel();
    mailer.send(
        Message::new().sender("s@x.com").to("a@x.com").body("hi"),
        move |result| {
            let _ = tx.send(result);
        },
    );
    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("callback fired");
    assert!(result.is_err());
}

#[test]
fn bcc_header_stays_visible_for_sendmail() {
    let mut mailer = Mailer::new();
    mailer.register(Arc::new(SendmailTransport::new()));

    let composed = mailer
        .compose(
            &Message::new()
                .sender("s@x.com")
                .to("a@x.com")
                .bcc("b@x.com"),
        )
        .expect("composed");
    assert!(composed.headers().contains("Bcc: b@x.com"));
    assert_eq!(composed.envelope().bcc(), ["b@x.com"]);
}
