//! Fixtures shared by the service tests.

use chrono::{Duration, TimeZone, Utc};

use crate::audit::{ActorAuditor, AuditStamp};
use crate::models::{Account, Article, Comment};
use crate::service::NewArticle;
use crate::store::memory::InMemoryStore;
use crate::store::Store;

pub(crate) fn post(title: &str, content: &str, hashtag: Option<&str>) -> NewArticle {
    NewArticle {
        title: title.into(),
        content: content.into(),
        hashtag: hashtag.map(String::from),
    }
}

fn at(minutes: i64) -> AuditStamp {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    AuditStamp::new("uno", t0 + Duration::minutes(minutes))
}

/// Two accounts, four articles and three comments on article 1.
///
/// | id | title | hashtag | author |
/// |----|-------|---------|--------|
/// | 1 | Java basics | #java | uno |
/// | 2 | Spring Boot intro | #spring | dos |
/// | 3 | Java streams | #java | dos |
/// | 4 | Untagged notes | - | dos |
pub(crate) async fn seeded_store() -> (InMemoryStore, ActorAuditor) {
    let store = InMemoryStore::new();
    let uno = store
        .insert_account(
            &Account::new("uno", "{noop}pw", Some("uno@example.com".into()), Some("Uno".into()), None),
            &at(0),
        )
        .await
        .unwrap();
    let dos = store
        .insert_account(
            &Account::new("dos", "{noop}pw", None, Some("Dos".into()), Some("second".into())),
            &at(0),
        )
        .await
        .unwrap();

    let rows = [
        (uno.clone(), "Java basics", "Java content", Some("#java")),
        (dos.clone(), "Spring Boot intro", "Spring content", Some("#spring")),
        (dos.clone(), "Java streams", "Streams content", Some("#java")),
        (dos.clone(), "Untagged notes", "Notes content", None),
    ];
    let mut first = None;
    for (i, (author, title, content, tag)) in rows.into_iter().enumerate() {
        let article = Article::new(author, title, content, tag.map(String::from));
        let saved = store
            .insert_article(&article, &at(i as i64 + 1))
            .await
            .unwrap();
        first.get_or_insert(saved);
    }

    let first = first.unwrap();
    for (minute, text) in [(10, "first"), (20, "second"), (30, "third")] {
        let comment = Comment::new(&first, dos.clone(), text).unwrap();
        store.insert_comment(&comment, &at(minute)).await.unwrap();
    }

    (store, ActorAuditor::new("uno"))
}
