//! End-to-end flow across the core components: registration, login
//! verification, sending, guarded reads, and the read transition.

use std::sync::Arc;

use courier_core::credentials::{CredentialStore, HashSettings};
use courier_core::directory::Directory;
use courier_core::guard;
use courier_core::messages::MessageStore;
use courier_db::Database;
use courier_types::api::RegisterRequest;
use courier_types::error::Error;

fn components() -> (CredentialStore, Directory, MessageStore) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let credentials = CredentialStore::new(
        db.clone(),
        HashSettings {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
    );
    let directory = Directory::new(db.clone());
    let messages = MessageStore::new(db, directory.clone());
    (credentials, directory, messages)
}

fn request(username: &str, first_name: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: format!("{username}-super-secret"),
        first_name: first_name.to_string(),
        last_name: "Example".to_string(),
        phone: "+15550001111".to_string(),
    }
}

#[tokio::test]
async fn direct_messaging_flow() {
    let (credentials, directory, messages) = components();

    // three accounts
    for (username, first_name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
        let profile = credentials.register(request(username, first_name)).await.unwrap();
        assert_eq!(profile.username, username);
    }

    // alice logs in
    assert!(
        credentials
            .authenticate("alice", "alice-super-secret")
            .await
            .unwrap()
    );
    credentials.record_login("alice").unwrap();

    // alice sends bob a message; it starts unread
    let sent = messages.send("alice", "bob", "hi").unwrap();
    assert!(sent.read_at.is_none());

    // the directory resolves counterparts without leaking credentials
    let bob = directory.resolve("bob").unwrap();
    assert_eq!(bob.first_name, "Bob");

    // bob may fetch it, carol is rejected by the guard before the store
    let fetched = messages.get(sent.id).unwrap();
    assert!(guard::can_read(&fetched, "bob"));
    assert!(guard::can_read(&fetched, "alice"));
    assert!(!guard::can_read(&fetched, "carol"));

    // only bob may mark it read; alice's attempt never reaches the store
    assert!(!guard::can_mark_read(&fetched, "alice"));
    assert!(guard::can_mark_read(&fetched, "bob"));

    let receipt = messages.mark_read(sent.id).unwrap();
    assert!(receipt.read_at >= sent.sent_at);

    // read is terminal
    assert!(matches!(
        messages.mark_read(sent.id),
        Err(Error::Conflict(_))
    ));
    let after = messages.get(sent.id).unwrap();
    assert_eq!(after.read_at, Some(receipt.read_at));

    // the exchange shows up in both mailboxes
    let outbox = messages.messages_from("alice").unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to_user.username, "bob");

    let inbox = messages.messages_to("bob").unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].from_user.username, "alice");
    assert_eq!(inbox[0].read_at, Some(receipt.read_at));
}
