//! Catalog endpoints: how each query and mutation maps onto the REST API.

use std::sync::Arc;

use futures::FutureExt;
use libris_api_types::{Book, BorrowRecord, BorrowRequest, NewBook};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::{Fetcher, MutationKind, QueryKey};
use crate::query::{MutationEndpoint, MutationError, QueryData};
use crate::transport::{ApiRequest, Transport, TransportError};

/// `GET` request for a query key.
pub fn query_request(key: &QueryKey) -> ApiRequest {
    ApiRequest::get(key.to_string())
}

/// Decode a query's `data` payload.
pub fn decode_query(key: &QueryKey, data: Value) -> Result<QueryData, TransportError> {
    let decoded = match key {
        QueryKey::AllBooks => from_data(data).map(|books| QueryData::Books(Arc::new(books))),
        QueryKey::BookById(_) => from_data(data).map(|book| QueryData::Book(Arc::new(book))),
        QueryKey::BorrowSummaries => {
            from_data(data).map(|list| QueryData::BorrowSummaries(Arc::new(list)))
        }
    };
    decoded.map_err(|err| TransportError::decode(format!("unexpected `{key}` payload: {err}")))
}

/// Fetcher that loads `key` through `transport`.
pub fn fetcher(transport: Arc<dyn Transport>, key: QueryKey) -> Fetcher {
    Arc::new(move || {
        let transport = transport.clone();
        let key = key.clone();
        async move {
            let data = transport.execute(query_request(&key)).await?;
            decode_query(&key, data)
        }
        .boxed()
    })
}

fn from_data<T: DeserializeOwned>(data: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(data)
}

fn book_path(mutation: MutationKind, id: &str) -> Result<String, MutationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(MutationError::encode(mutation, "missing book id"));
    }
    Ok(format!("books/{id}"))
}

fn to_body<T: serde::Serialize>(mutation: MutationKind, body: &T) -> Result<Value, MutationError> {
    serde_json::to_value(body).map_err(|err| MutationError::encode(mutation, err))
}

fn decode_output<T: DeserializeOwned>(mutation: MutationKind, data: Value) -> Result<T, MutationError> {
    from_data(data).map_err(|err| MutationError::decode(mutation, err))
}

/// `POST books`
pub struct CreateBook;

impl MutationEndpoint for CreateBook {
    type Input = NewBook;
    type Output = Book;
    const KIND: MutationKind = MutationKind::CreateBook;

    fn request(input: &NewBook) -> Result<ApiRequest, MutationError> {
        Ok(ApiRequest::post("books", to_body(Self::KIND, input)?))
    }

    fn decode(data: Value) -> Result<Book, MutationError> {
        decode_output(Self::KIND, data)
    }
}

/// `PUT books/{id}` with the full record.
pub struct UpdateBook;

impl MutationEndpoint for UpdateBook {
    type Input = Book;
    type Output = Book;
    const KIND: MutationKind = MutationKind::UpdateBook;

    fn request(input: &Book) -> Result<ApiRequest, MutationError> {
        let path = book_path(Self::KIND, &input.id)?;
        Ok(ApiRequest::put(path, to_body(Self::KIND, input)?))
    }

    fn decode(data: Value) -> Result<Book, MutationError> {
        decode_output(Self::KIND, data)
    }
}

/// `DELETE books/{id}`; the response carries no data.
pub struct DeleteBook;

impl MutationEndpoint for DeleteBook {
    type Input = String;
    type Output = ();
    const KIND: MutationKind = MutationKind::DeleteBook;

    fn request(id: &String) -> Result<ApiRequest, MutationError> {
        Ok(ApiRequest::delete(book_path(Self::KIND, id)?))
    }

    fn decode(_data: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

/// `POST borrow`
pub struct BorrowBook;

impl MutationEndpoint for BorrowBook {
    type Input = BorrowRequest;
    type Output = BorrowRecord;
    const KIND: MutationKind = MutationKind::BorrowBook;

    fn request(input: &BorrowRequest) -> Result<ApiRequest, MutationError> {
        Ok(ApiRequest::post("borrow", to_body(Self::KIND, input)?))
    }

    fn decode(data: Value) -> Result<BorrowRecord, MutationError> {
        decode_output(Self::KIND, data)
    }
}

#[cfg(test)]
mod tests {
    use libris_api_types::Genre;
    use reqwest::Method;
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn query_paths_follow_keys() {
        assert_eq!(query_request(&QueryKey::AllBooks).path, "books");
        assert_eq!(query_request(&QueryKey::BookById("42".into())).path, "books/42");
        assert_eq!(query_request(&QueryKey::BorrowSummaries).path, "borrow");
        assert_eq!(query_request(&QueryKey::AllBooks).method, Method::GET);
    }

    #[test]
    fn decode_book_list() {
        let data = json!([{
            "_id": "1", "title": "Dune", "author": "Frank Herbert", "genre": "FICTION",
            "isbn": "9780441013593", "description": "Spice", "copies": 2, "available": true
        }]);
        match decode_query(&QueryKey::AllBooks, data).expect("decode") {
            QueryData::Books(books) => assert_eq!(books[0].title, "Dune"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_mismatch_is_500() {
        let err = decode_query(&QueryKey::BorrowSummaries, json!({"nope": true})).expect_err("bad");
        assert_eq!(err.status, 500);
        assert!(err.message.contains("borrow"));
    }

    #[test]
    fn update_targets_book_id() {
        let book = Book {
            id: "7".into(),
            title: "Emma".into(),
            author: "Jane Austen".into(),
            genre: Genre::Fiction,
            isbn: "1".into(),
            description: "Matchmaking".into(),
            copies: 1,
            available: true,
        };
        let request = UpdateBook::request(&book).expect("request");
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "books/7");
        assert_eq!(request.body.expect("body")["_id"], "7");
    }

    #[test]
    fn delete_requires_id() {
        let err = DeleteBook::request(&"  ".to_string()).expect_err("empty id");
        assert_eq!(err.status(), 400);
        assert_eq!(DeleteBook::decode(Value::Null), Ok(()));
    }

    #[test]
    fn borrow_body_uses_camel_case_and_iso_date() {
        let request = BorrowBook::request(&BorrowRequest {
            book: "1".into(),
            quantity: 2,
            due_date: datetime!(2030-01-15 0:00 UTC),
        })
        .expect("request");
        let body = request.body.expect("body");
        assert_eq!(body["book"], "1");
        assert_eq!(body["quantity"], 2);
        assert_eq!(body["dueDate"], "2030-01-15T00:00:00Z");
    }
}
