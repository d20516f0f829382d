//! Fixed dataset shown when the server cannot be reached.

use chrono::{DateTime, TimeZone, Utc};
use family_tasks_core::models::{Category, FamilyMember, Task};

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn family_members() -> Vec<FamilyMember> {
    [
        (1, "Mom", Some("mom@family.com")),
        (2, "Dad", Some("dad@family.com")),
        (3, "Alice", Some("alice@family.com")),
        (4, "Bob", None),
    ]
    .into_iter()
    .map(|(id, name, email)| FamilyMember {
        id,
        name: name.to_string(),
        email: email.map(str::to_string),
        avatar_url: None,
        created_at: day(2024, 1, 1),
    })
    .collect()
}

pub fn categories() -> Vec<Category> {
    [
        (1, "Chores", "Household cleaning and maintenance", "#10b981"),
        (2, "Shopping", "Grocery and other shopping tasks", "#3b82f6"),
        (3, "School", "School-related tasks and activities", "#f59e0b"),
        (4, "Personal", "Individual tasks and goals", "#8b5cf6"),
    ]
    .into_iter()
    .map(|(id, name, description, color)| Category {
        id,
        name: name.to_string(),
        description: Some(description.to_string()),
        color: Some(color.to_string()),
        created_at: day(2024, 1, 1),
    })
    .collect()
}

pub fn tasks() -> Vec<Task> {
    let open = |id, title: &str, description: Option<&str>, due, member, category, created| Task {
        id,
        title: title.to_string(),
        description: description.map(str::to_string),
        due_date: due,
        is_completed: false,
        assigned_to: Some(member),
        category_id: Some(category),
        created_at: created,
        updated_at: created,
    };

    vec![
        open(
            1,
            "Clean the kitchen",
            Some("Wash dishes, wipe counters, and mop floor"),
            Some(day(2024, 12, 25)),
            1,
            1,
            day(2024, 12, 20),
        ),
        Task {
            is_completed: true,
            updated_at: day(2024, 12, 23),
            ..open(
                2,
                "Buy groceries",
                Some("Milk, eggs, bread, and vegetables"),
                Some(day(2024, 12, 24)),
                2,
                2,
                day(2024, 12, 19),
            )
        },
        open(
            3,
            "Finish homework",
            Some("Math problems and history essay"),
            Some(day(2024, 12, 22)),
            3,
            3,
            day(2024, 12, 21),
        ),
        open(4, "Walk the dog", None, None, 4, 4, day(2024, 12, 20)),
        open(
            5,
            "Vacuum living room",
            Some("Don't forget under the couch!"),
            Some(day(2024, 12, 21)),
            1,
            1,
            day(2024, 12, 18),
        ),
    ]
}
