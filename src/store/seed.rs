use crate::ids::TodoId;
use crate::model::TodoItem;
use chrono::{DateTime, Duration, Utc};

/// The six sample items a fresh service starts with, timed relative to `now`.
///
/// Ids are placeholders in seeding order; the store renumbers them from its
/// counter when seeding.
pub fn sample_items(now: DateTime<Utc>) -> Vec<TodoItem> {
    let open = |n: u64, title: &str, description: &str, priority: i32, age: Duration| TodoItem {
        id: TodoId(n),
        title: title.to_string(),
        description: Some(description.to_string()),
        is_completed: false,
        created_at: now - age,
        completed_at: None,
        priority,
    };
    let done = |item: TodoItem, after: Duration| TodoItem {
        is_completed: true,
        completed_at: Some(item.created_at + after),
        ..item
    };

    vec![
        open(
            1,
            "Learn the may coroutine runtime",
            "Read about coroutines, channels and may_minihttp",
            3,
            Duration::days(2),
        ),
        open(
            2,
            "Go grocery shopping",
            "Buy ingredients for dinner: rice, beans, meat and vegetables",
            2,
            Duration::days(1),
        ),
        done(
            open(
                3,
                "Exercise",
                "Go to the gym or take a 30 minute walk",
                2,
                Duration::days(3),
            ),
            Duration::hours(2),
        ),
        open(
            4,
            "Read the Rust release notes",
            "Catch up on the latest stable release and edition changes",
            1,
            Duration::hours(5),
        ),
        done(
            open(
                5,
                "Team meeting",
                "Daily standup at 9am - review sprint progress",
                3,
                Duration::days(1),
            ),
            Duration::hours(1),
        ),
        open(
            6,
            "Tidy up the desk",
            "Clean the desk, organize cables and papers",
            1,
            Duration::hours(3),
        ),
    ]
}
