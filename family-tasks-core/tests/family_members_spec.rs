use speculate2::speculate;

speculate! {
    use family_tasks_core::models::*;
    use family_tasks_core::{Database, EntityKind, Error, ValidationError};

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        db
    }

    fn create_member(db: &Database, name: &str, email: Option<&str>) -> FamilyMember {
        db.create_family_member(CreateFamilyMemberInput {
            name: name.to_string(),
            email: email.map(str::to_string),
            avatar_url: None,
        })
        .expect("Failed to create family member")
    }

    describe "create_family_member" {
        it "returns the persisted member with store-assigned fields" {
            let db = setup_db();
            let before = chrono::Utc::now();

            let member = db.create_family_member(CreateFamilyMemberInput {
                name: "Mom".into(),
                email: Some("mom@family.com".into()),
                avatar_url: Some("https://example.com/mom.png".into()),
            }).unwrap();

            assert!(member.id > 0);
            assert_eq!(member.name, "Mom");
            assert_eq!(member.email.as_deref(), Some("mom@family.com"));
            assert_eq!(member.avatar_url.as_deref(), Some("https://example.com/mom.png"));
            assert!(member.created_at >= before);
        }

        it "assigns unique ids" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", None);
            let dad = create_member(&db, "Dad", None);
            assert_ne!(mom.id, dad.id);
        }

        it "does not reuse ids of deleted members" {
            let db = setup_db();
            let first = create_member(&db, "Mom", None);
            db.delete_family_member(DeleteInput { id: first.id }).unwrap();
            let second = create_member(&db, "Dad", None);
            assert!(second.id > first.id);
        }

        it "rejects an empty name" {
            let db = setup_db();
            let err = db.create_family_member(CreateFamilyMemberInput {
                name: "  ".into(),
                email: None,
                avatar_url: None,
            }).unwrap_err();

            assert!(matches!(err, Error::Validation(ValidationError::Empty { field: "name" })));
            assert!(db.get_family_members().unwrap().is_empty());
        }

        it "rejects a malformed email" {
            let db = setup_db();
            let err = db.create_family_member(CreateFamilyMemberInput {
                name: "Bob".into(),
                email: Some("not-an-email".into()),
                avatar_url: None,
            }).unwrap_err();

            assert!(matches!(err, Error::Validation(ValidationError::InvalidEmail(_))));
        }

        it "rejects a malformed avatar url" {
            let db = setup_db();
            let err = db.create_family_member(CreateFamilyMemberInput {
                name: "Bob".into(),
                email: None,
                avatar_url: Some("avatar.png".into()),
            }).unwrap_err();

            assert!(matches!(err, Error::Validation(ValidationError::InvalidUrl(_))));
        }
    }

    describe "get_family_members" {
        it "returns an empty list when no members exist" {
            let db = setup_db();
            assert!(db.get_family_members().unwrap().is_empty());
        }

        it "includes every created member" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", Some("mom@family.com"));
            let bob = create_member(&db, "Bob", None);

            let members = db.get_family_members().unwrap();
            assert_eq!(members.len(), 2);
            assert!(members.contains(&mom));
            assert!(members.contains(&bob));
        }
    }

    describe "update_family_member" {
        it "changes only the provided fields" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", Some("mom@family.com"));

            let mut input = UpdateFamilyMemberInput::new(mom.id);
            input.name = Patch::Value("Mother".into());
            let updated = db.update_family_member(input).unwrap();

            assert_eq!(updated.name, "Mother");
            assert_eq!(updated.email, mom.email);
            assert_eq!(updated.created_at, mom.created_at);
            assert_eq!(db.get_family_member(mom.id).unwrap(), Some(updated));
        }

        it "clears a field set to null" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", Some("mom@family.com"));

            let mut input = UpdateFamilyMemberInput::new(mom.id);
            input.email = Patch::Null;
            let updated = db.update_family_member(input).unwrap();

            assert_eq!(updated.email, None);
            assert_eq!(updated.name, "Mom");
        }

        it "rejects a null name" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", None);

            let mut input = UpdateFamilyMemberInput::new(mom.id);
            input.name = Patch::Null;
            let err = db.update_family_member(input).unwrap_err();

            assert!(matches!(err, Error::Validation(ValidationError::NotNullable { field: "name" })));
        }

        it "fails with not found for an unknown id" {
            let db = setup_db();
            let mut input = UpdateFamilyMemberInput::new(999_999);
            input.name = Patch::Value("Ghost".into());

            let err = db.update_family_member(input).unwrap_err();
            assert!(matches!(
                err,
                Error::NotFound { entity: EntityKind::FamilyMember, id: 999_999 }
            ));
            assert_eq!(err.to_string(), "family member with id 999999 not found");
        }
    }

    describe "delete_family_member" {
        it "removes the member" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", None);

            let result = db.delete_family_member(DeleteInput { id: mom.id }).unwrap();

            assert!(result.success);
            assert_eq!(db.get_family_member(mom.id).unwrap(), None);
        }

        it "unassigns every task assigned to the member" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", None);
            let dad = create_member(&db, "Dad", None);
            let mut ids = Vec::new();
            for title in ["Clean kitchen", "Vacuum living room"] {
                let mut input = CreateTaskInput::titled(title);
                input.assigned_to = Some(mom.id);
                ids.push(db.create_task(input).unwrap().id);
            }
            let mut dads = CreateTaskInput::titled("Buy groceries");
            dads.assigned_to = Some(dad.id);
            let dads = db.create_task(dads).unwrap();

            db.delete_family_member(DeleteInput { id: mom.id }).unwrap();

            for id in ids {
                let task = db.get_task(id).unwrap().unwrap();
                assert_eq!(task.assigned_to, None);
                assert!(task.updated_at >= task.created_at);
            }
            assert_eq!(db.get_task(dads.id).unwrap().unwrap().assigned_to, Some(dad.id));
        }

        it "succeeds twice in a row" {
            let db = setup_db();
            let mom = create_member(&db, "Mom", None);

            assert!(db.delete_family_member(DeleteInput { id: mom.id }).unwrap().success);
            assert!(db.delete_family_member(DeleteInput { id: mom.id }).unwrap().success);
        }

        it "succeeds for a member that never existed" {
            let db = setup_db();
            assert!(db.delete_family_member(DeleteInput { id: 999_999 }).unwrap().success);
        }
    }
}
