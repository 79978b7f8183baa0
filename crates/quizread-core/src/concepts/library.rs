//! Book metadata with links into object storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::Result;
use crate::ids::fresh_id;
use crate::object_store::{object_name_from_url, ObjectStore};
use crate::outcome::ActionOutcome;
use crate::store::Store;

const BOOKS: &str = "Library.books";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub storage_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadInput {
    pub owner_id: String,
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookInput {
    pub owner_id: String,
    pub title: String,
    pub storage_url: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRef {
    pub book_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub owner_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedBookRef {
    pub owner_id: String,
    pub book_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupInput {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUrlInput {
    pub owner_id: String,
    pub book_id: String,
    #[serde(default)]
    pub expires_in_minutes: Option<i64>,
}

#[derive(Clone)]
pub struct Library {
    store: Store,
    objects: Arc<dyn ObjectStore>,
}

impl Library {
    pub fn new(store: Store, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Reserves an object name and signs an upload URL for it.
    pub fn prepare_upload(&self, input: PrepareUploadInput) -> Result<ActionOutcome> {
        if input.file_name.trim().is_empty() {
            return Ok(ActionOutcome::error("fileName cannot be empty"));
        }
        let content_type = input
            .content_type
            .as_deref()
            .unwrap_or("application/pdf");
        let upload =
            match self
                .objects
                .prepare_upload(&input.file_name, content_type, &input.owner_id)
            {
                Ok(upload) => upload,
                Err(e) => return Ok(ActionOutcome::Error(e)),
            };
        Ok(ActionOutcome::ok(json!({
            "signedUrl": upload.signed_url,
            "publicUrl": upload.public_url,
            "fileName": upload.file_name,
        })))
    }

    /// Records a book. When `fileName` is given the object must already be
    /// uploaded.
    pub fn add_book(&self, input: AddBookInput) -> Result<ActionOutcome> {
        if input.title.trim().is_empty() {
            return Ok(ActionOutcome::error("title cannot be empty"));
        }
        if input.storage_url.trim().is_empty() {
            return Ok(ActionOutcome::error("storageUrl cannot be empty"));
        }
        if let Some(file_name) = &input.file_name {
            if !self.objects.exists(file_name) {
                return Ok(ActionOutcome::error(
                    "File not found in storage. Please upload the file first.",
                ));
            }
        }
        let doc = BookDoc {
            id: fresh_id(),
            owner_id: input.owner_id,
            title: input.title,
            storage_url: input.storage_url,
            created_at: Utc::now(),
        };
        self.store
            .insert(BOOKS, &doc.id, &serde_json::to_value(&doc)?)?;
        Ok(ActionOutcome::ok(json!({ "bookId": doc.id })))
    }

    /// Existence check. Never a domain error.
    pub fn get_book(&self, input: BookRef) -> Result<ActionOutcome> {
        let exists = self.store.get(BOOKS, &input.book_id)?.is_some();
        Ok(ActionOutcome::ok(json!({ "exists": exists })))
    }

    /// Ids of the user's books. Never a domain error.
    pub fn list_books(&self, input: OwnerRef) -> Result<ActionOutcome> {
        let ids: Vec<String> = self
            .user_books(OwnerRef {
                owner_id: input.owner_id,
            })?
            .into_iter()
            .map(|b| b.id)
            .collect();
        Ok(ActionOutcome::ok(json!({ "bookIds": ids })))
    }

    /// Deletes the book record, then its object best-effort.
    pub fn remove_book(&self, input: OwnedBookRef) -> Result<ActionOutcome> {
        let book: BookDoc = match self.store.get(BOOKS, &input.book_id)? {
            Some(doc) => serde_json::from_value(doc)?,
            None => return Ok(ActionOutcome::error("Book not found")),
        };
        if book.owner_id != input.owner_id {
            return Ok(ActionOutcome::error("Book does not belong to user"));
        }
        self.store.remove(BOOKS, &input.book_id)?;
        if let Some(name) = object_name_from_url(&book.storage_url) {
            if let Err(e) = self.objects.delete(name) {
                warn!(object = name, error = %e, "failed to delete stored file");
            }
        }
        Ok(ActionOutcome::empty())
    }

    /// Deletes an orphaned upload.
    pub fn cleanup_failed_upload(&self, input: CleanupInput) -> Result<ActionOutcome> {
        if input.file_name.trim().is_empty() {
            return Ok(ActionOutcome::error("fileName cannot be empty"));
        }
        match self.objects.delete(&input.file_name) {
            Ok(()) => Ok(ActionOutcome::empty()),
            Err(e) => Ok(ActionOutcome::Error(e)),
        }
    }

    /// Signed read URL for an owned book.
    pub fn get_view_url(&self, input: ViewUrlInput) -> Result<ActionOutcome> {
        let book: BookDoc = match self.store.get(BOOKS, &input.book_id)? {
            Some(doc) => serde_json::from_value(doc)?,
            None => return Ok(ActionOutcome::error("Book not found")),
        };
        if book.owner_id != input.owner_id {
            return Ok(ActionOutcome::error("Book does not belong to user"));
        }
        let Some(name) = object_name_from_url(&book.storage_url) else {
            return Ok(ActionOutcome::error("Book has no stored file"));
        };
        let minutes = input.expires_in_minutes.unwrap_or(60);
        match self.objects.signed_view_url(name, minutes) {
            Ok(url) => Ok(ActionOutcome::ok(json!({ "viewUrl": url }))),
            Err(e) => Ok(ActionOutcome::Error(e)),
        }
    }

    pub fn book(&self, input: BookRef) -> Result<Option<BookDoc>> {
        match self.store.get(BOOKS, &input.book_id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// A user's books, newest first.
    pub fn user_books(&self, input: OwnerRef) -> Result<Vec<BookDoc>> {
        let mut books: Vec<BookDoc> = self
            .store
            .find(BOOKS, &[("ownerId", &json!(input.owner_id))])?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(books)
    }

    /// Every book in the library, newest first.
    pub fn all_books(&self) -> Result<Vec<BookDoc>> {
        let mut books: Vec<BookDoc> = self
            .store
            .all(BOOKS)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::LocalObjectStore;

    fn library() -> (tempfile::TempDir, Library, Arc<LocalObjectStore>) {
        let dir = tempfile::TempDir::new().unwrap();
        let objects = Arc::new(LocalObjectStore::new(
            dir.path().to_path_buf(),
            "http://localhost:8080".to_string(),
            b"secret",
        ));
        let lib = Library::new(Store::in_memory().unwrap(), objects.clone());
        (dir, lib, objects)
    }

    fn add(lib: &Library, owner: &str, title: &str) -> String {
        let outcome = lib
            .add_book(AddBookInput {
                owner_id: owner.to_string(),
                title: title.to_string(),
                storage_url: format!("http://localhost:8080/objects/books/{owner}/1_{title}.pdf"),
                file_name: None,
            })
            .unwrap();
        outcome.field("bookId").unwrap().as_str().unwrap().to_string()
    }

    #[test]
    fn prepare_upload_signs_a_scoped_name() {
        let (_dir, lib, _) = library();
        let outcome = lib
            .prepare_upload(PrepareUploadInput {
                owner_id: "u1".to_string(),
                file_name: "book.pdf".to_string(),
                content_type: None,
            })
            .unwrap();
        assert!(!outcome.is_error());
        let name = outcome.field("fileName").unwrap().as_str().unwrap();
        assert!(name.starts_with("books/u1/"));

        let err = lib
            .prepare_upload(PrepareUploadInput {
                owner_id: "u1".to_string(),
                file_name: "  ".to_string(),
                content_type: None,
            })
            .unwrap();
        assert_eq!(err.error_message(), Some("fileName cannot be empty"));
    }

    #[test]
    fn add_book_validates_and_optionally_verifies_upload() {
        let (_dir, lib, objects) = library();
        let err = lib
            .add_book(AddBookInput {
                owner_id: "u1".to_string(),
                title: "".to_string(),
                storage_url: "http://x/objects/a".to_string(),
                file_name: None,
            })
            .unwrap();
        assert_eq!(err.error_message(), Some("title cannot be empty"));

        let err = lib
            .add_book(AddBookInput {
                owner_id: "u1".to_string(),
                title: "T".to_string(),
                storage_url: "".to_string(),
                file_name: None,
            })
            .unwrap();
        assert_eq!(err.error_message(), Some("storageUrl cannot be empty"));

        let err = lib
            .add_book(AddBookInput {
                owner_id: "u1".to_string(),
                title: "T".to_string(),
                storage_url: "http://x/objects/books/u1/1_a.pdf".to_string(),
                file_name: Some("books/u1/1_a.pdf".to_string()),
            })
            .unwrap();
        assert_eq!(
            err.error_message(),
            Some("File not found in storage. Please upload the file first.")
        );

        objects.write("books/u1/1_a.pdf", b"pdf").unwrap();
        let ok = lib
            .add_book(AddBookInput {
                owner_id: "u1".to_string(),
                title: "T".to_string(),
                storage_url: "http://x/objects/books/u1/1_a.pdf".to_string(),
                file_name: Some("books/u1/1_a.pdf".to_string()),
            })
            .unwrap();
        assert!(!ok.is_error());
    }

    #[test]
    fn get_book_and_list_books_never_error() {
        let (_dir, lib, _) = library();
        let missing = lib
            .get_book(BookRef {
                book_id: "nope".to_string(),
            })
            .unwrap();
        assert_eq!(missing.field("exists"), Some(&json!(false)));

        let id = add(&lib, "u1", "one");
        let found = lib.get_book(BookRef { book_id: id.clone() }).unwrap();
        assert_eq!(found.field("exists"), Some(&json!(true)));

        let listed = lib
            .list_books(OwnerRef {
                owner_id: "u1".to_string(),
            })
            .unwrap();
        assert_eq!(listed.field("bookIds"), Some(&json!([id])));
    }

    #[test]
    fn remove_book_checks_ownership_and_tolerates_missing_object() {
        let (_dir, lib, _) = library();
        let id = add(&lib, "u1", "one");
        let err = lib
            .remove_book(OwnedBookRef {
                owner_id: "u2".to_string(),
                book_id: id.clone(),
            })
            .unwrap();
        assert_eq!(err.error_message(), Some("Book does not belong to user"));

        let ok = lib
            .remove_book(OwnedBookRef {
                owner_id: "u1".to_string(),
                book_id: id.clone(),
            })
            .unwrap();
        assert!(!ok.is_error());

        let err = lib
            .remove_book(OwnedBookRef {
                owner_id: "u1".to_string(),
                book_id: id,
            })
            .unwrap();
        assert_eq!(err.error_message(), Some("Book not found"));
    }

    #[test]
    fn user_books_come_back_newest_first() {
        let (_dir, lib, _) = library();
        let first = add(&lib, "u1", "first");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = add(&lib, "u1", "second");
        add(&lib, "u2", "other");

        let books = lib
            .user_books(OwnerRef {
                owner_id: "u1".to_string(),
            })
            .unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
        assert_eq!(lib.all_books().unwrap().len(), 3);
    }

    #[test]
    fn view_url_requires_an_owned_book() {
        let (_dir, lib, _) = library();
        let id = add(&lib, "u1", "one");
        let err = lib
            .get_view_url(ViewUrlInput {
                owner_id: "u2".to_string(),
                book_id: id.clone(),
                expires_in_minutes: None,
            })
            .unwrap();
        assert_eq!(err.error_message(), Some("Book does not belong to user"));

        let ok = lib
            .get_view_url(ViewUrlInput {
                owner_id: "u1".to_string(),
                book_id: id,
                expires_in_minutes: Some(5),
            })
            .unwrap();
        let url = ok.field("viewUrl").unwrap().as_str().unwrap();
        assert!(url.contains("sig="));
    }
}
