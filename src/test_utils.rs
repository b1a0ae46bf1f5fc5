// Test fixtures shared by the unit tests.
//
// `sample_database` writes a small shop schema (users, categories,
// products, orders) to a file inside a fresh temporary directory. The
// directory is removed when the returned guard is dropped.

use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SAMPLE_SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        registration_date TEXT NOT NULL,
        last_login TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        parent_id INTEGER,
        FOREIGN KEY (parent_id) REFERENCES categories(id)
    );
    CREATE TABLE products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        price REAL NOT NULL,
        category_id INTEGER NOT NULL,
        stock_quantity INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        FOREIGN KEY (category_id) REFERENCES categories(id)
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        order_date TEXT NOT NULL,
        total_amount REAL NOT NULL,
        status TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    );
";

pub const SAMPLE_DATA: &str = "
    INSERT INTO users VALUES
        (1, 'alice', 'alice@example.com', 'hash_10231', '2024-01-05 09:12:00', '2024-06-01 18:00:00', 1),
        (2, 'bob', 'bob@example.com', 'hash_55120', '2024-02-11 14:30:00', NULL, 1),
        (3, 'carol', 'carol@example.com', 'hash_80412', '2024-02-20 08:45:00', '2024-05-28 07:10:00', 0);
    INSERT INTO categories VALUES
        (1, 'Electronics', 'Devices and accessories', NULL),
        (2, 'Books', 'Books and magazines', NULL),
        (3, 'Phones', 'Smartphones', 1),
        (4, 'Novels', NULL, 2);
    INSERT INTO products VALUES
        (1, 'Phone X', 'Flagship phone', 799.0, 3, 12, '2024-01-10'),
        (2, 'Laptop Pro', NULL, 1299.5, 1, 4, '2024-01-12'),
        (3, 'The Long Road', 'A novel', 14.99, 4, 40, '2024-03-02');
    INSERT INTO orders VALUES
        (1, 1, '2024-04-01', 813.99, 'delivered'),
        (2, 2, '2024-04-03', 1299.5, 'shipped'),
        (3, 1, '2024-05-17', 29.98, 'pending');
";

/// Creates `sample.db` in a new temporary directory.
pub fn sample_database() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.db");
    let conn = Connection::open(&path).expect("create sample database");
    conn.execute_batch(SAMPLE_SCHEMA).expect("create sample schema");
    conn.execute_batch(SAMPLE_DATA).expect("insert sample rows");
    (dir, path)
}

/// Creates an empty database file in a new temporary directory.
pub fn empty_database() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("empty.db");
    Connection::open(&path)
        .and_then(|c| c.execute_batch("PRAGMA user_version = 1"))
        .expect("create empty database");
    (dir, path)
}

#[test]
fn test_sample_database_contents() {
    let (_dir, path) = sample_database();
    let conn = Connection::open(path).unwrap();
    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    assert_eq!(users, 3);
}
