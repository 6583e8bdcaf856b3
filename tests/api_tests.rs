//! API integration tests
//!
//! These run against a server started separately (cargo run) with a reachable
//! Postgres, hence the ignore markers.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Create a book with a unique-ish isbn and return its id and isbn
async fn create_book(client: &Client, tag: &str) -> (i64, String) {
    let isbn = format!("isbn-{}-{}", tag, std::process::id());
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "As aventuras",
            "author": "Fulano",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    (body["id"].as_i64().expect("No book ID"), isbn)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();
    let (book_id, isbn) = create_book(&client, "crud").await;

    // Read it back
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["isbn"], isbn.as_str());

    // Duplicate isbn is rejected with an error list
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Outro livro",
            "author": "Ciclano",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Isbn already registered");

    // Update
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({
            "title": "As aventuras II",
            "author": "Fulano",
            "isbn": isbn
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_validation_errors() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "",
            "author": "",
            "isbn": ""
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let (_, isbn) = create_book(&client, "loan").await;

    // Lend the book
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Fulano",
            "email": "fulano@gmail.com"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["id"].as_i64().expect("No loan ID");

    // Lending it again is a business-rule error
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Ciclano",
            "email": "ciclano@gmail.com"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book already loaned");

    // Filtered search echoes the page envelope
    let response = client
        .get(format!(
            "{}/loans?isbn={}&customer=Fulano&page=0&size=10",
            BASE_URL, isbn
        ))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["pageable"]["pageNumber"], 0);
    assert_eq!(body["pageable"]["pageSize"], 10);
    assert_eq!(body["content"][0]["book"]["isbn"], isbn.as_str());

    // Return the book
    let response = client
        .patch(format!("{}/loans/{}", BASE_URL, loan_id))
        .json(&json!({ "returned": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // The book can be lent again afterwards
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Ciclano",
            "email": "ciclano@gmail.com"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_reopen_conflicts_with_active_loan() {
    let client = Client::new();
    let (_, isbn) = create_book(&client, "reopen").await;

    // First loan, then returned
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Fulano",
            "email": "fulano@gmail.com"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let first_loan_id = body["id"].as_i64().expect("No loan ID");

    let response = client
        .patch(format!("{}/loans/{}", BASE_URL, first_loan_id))
        .json(&json!({ "returned": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Second loan is now active
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "customer": "Ciclano",
            "email": "ciclano@gmail.com"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Reopening the first loan collides with the active one: the unique index
    // violation must surface as the business-rule error, not a 500
    let response = client
        .patch(format!("{}/loans/{}", BASE_URL, first_loan_id))
        .json(&json!({ "returned": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book already loaned");
}

#[tokio::test]
#[ignore]
async fn test_loan_unknown_isbn() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "isbn": "does-not-exist",
            "customer": "Fulano",
            "email": "fulano@gmail.com"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"][0], "Book not found for passed isbn");
}

#[tokio::test]
#[ignore]
async fn test_return_unknown_loan_is_404() {
    let client = Client::new();

    let response = client
        .patch(format!("{}/loans/999999999", BASE_URL))
        .json(&json!({ "returned": true }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
