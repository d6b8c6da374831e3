#![cfg(feature = "file-transport")]

use std::{
    fs,
    path::PathBuf,
    sync::{mpsc, Arc},
    time::Duration,
};

use mailforge::{transport::file::FileTransport, Delivery, Mailer, Message};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mailforge-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn writes_message_and_envelope() {
    let dir = scratch_dir("writes");
    let mut mailer = Mailer::new();
    mailer.register(Arc::new(FileTransport::new(&dir)));

    let (tx, rx) = mpsc::channel();
    mailer.send(
        Message::new()
            .sender("s@x.com")
            .to("a@x.com")
            .subject("On disk")
            .body("filed away"),
        move |result| {
            let _ = tx.send(result);
        },
    );
    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("callback fired");
    assert_eq!(result.expect("delivered"), Delivery::Accepted);

    let mut eml = None;
    let mut json = None;
    for entry in fs::read_dir(&dir).expect("readable dir") {
        let path = entry.expect("entry").path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("eml") => eml = Some(path),
            Some("json") => json = Some(path),
            _ => {}
        }
    }

    let message = fs::read_to_string(eml.expect(".eml written")).expect("readable message");
    assert!(message.contains("Subject: On disk"));
    assert!(message.contains("\r\n\r\nfiled away"));

    let envelope = fs::read_to_string(json.expect(".json written")).expect("readable envelope");
    assert!(envelope.contains("a@x.com"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn failure_to_write_surfaces_as_transport_error() {
    let dir = std::env::temp_dir().join("mailforge-does-not-exist-subdir/nested");
    let mut mailer = Mailer::new();
    mailer.register(Arc::new(FileTransport::new(dir)));

    let (tx, rx) = mpsc::channel();
    mailer.send(Message::new().to("a@x.com"), move |result| {
        let _ = tx.send(result);
    });
    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("callback fired");
    assert!(result.is_err());
}
