//! Mock task service for testing
//!
//! A small HTTP/1.1 server on a random local port that implements the same
//! REST contract as the real task service, so `HttpTaskApi` can be exercised
//! end to end:
//! - POST /api/auth/signin, POST /api/auth/signup
//! - GET/POST /api/tasks, GET /api/tasks/overdue
//! - GET/PUT/DELETE /api/tasks/{id}, PATCH /api/tasks/{id}/status?status=...
//!
//! One user (`ada` / `secret`) exists from the start. Tokens are
//! `token-<username>`.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Task, TaskFields, TaskStatus};

/// Mock task server for testing
pub struct MockTaskServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Failure injection
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Answer every task route with HTTP 500
    pub fail_tasks: bool,
}

#[derive(Debug, Clone)]
struct MockUser {
    id: i64,
    password: String,
    email: String,
}

#[derive(Debug, Default)]
struct MockState {
    users: HashMap<String, MockUser>,
    /// (owner username, task)
    tasks: Vec<(String, Task)>,
    next_task_id: i64,
}

#[derive(Deserialize)]
struct SignInBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpBody {
    username: String,
    email: String,
    password: String,
}

struct Request {
    method: String,
    path: String,
    query: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl MockTaskServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let mut state = MockState {
            next_task_id: 1,
            ..Default::default()
        };
        state.users.insert(
            "ada".to_string(),
            MockUser {
                id: 1,
                password: "secret".to_string(),
                email: "ada@example.com".to_string(),
            },
        );
        let state = Arc::new(Mutex::new(state));

        // Non-blocking accept so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let state = state.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &state);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL to hand to `HttpTaskApi`
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockTaskServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = data[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buffer[..n]);
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target, String::new()),
    };

    Some(Request {
        method,
        path,
        query,
        headers,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &Mutex<MockState>) {
    let _ = stream.set_nonblocking(false);

    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let (status, body) = route(&request, config, state);
    send_response(&mut stream, status, &body);
}

fn route(request: &Request, config: &MockConfig, state: &Mutex<MockState>) -> (u16, String) {
    let mut state = match state.lock() {
        Ok(s) => s,
        Err(_) => return (500, message("Mock state poisoned")),
    };

    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/api/auth/signin") => sign_in(request, &state),
        ("POST", "/api/auth/signup") => sign_up(request, &mut state),
        (_, path) if path.starts_with("/api/tasks") => {
            let Some(owner) = authenticate(request, &state) else {
                return (401, message("Full authentication is required to access this resource"));
            };
            if config.fail_tasks {
                return (500, message("Internal server error"));
            }
            tasks(request, &owner, &mut state)
        }
        _ => (404, message("Not found")),
    }
}

fn sign_in(request: &Request, state: &MockState) -> (u16, String) {
    let Ok(body) = serde_json::from_slice::<SignInBody>(&request.body) else {
        return (400, message("Invalid request"));
    };
    match state.users.get(&body.username) {
        Some(user) if user.password == body.password => (
            200,
            json!({
                "accessToken": format!("token-{}", body.username),
                "type": "Bearer",
                "id": user.id,
                "username": body.username,
                "email": user.email,
            })
            .to_string(),
        ),
        _ => (401, message("Bad credentials")),
    }
}

fn sign_up(request: &Request, state: &mut MockState) -> (u16, String) {
    let Ok(body) = serde_json::from_slice::<SignUpBody>(&request.body) else {
        return (400, message("Invalid request"));
    };
    if state.users.contains_key(&body.username) {
        return (400, message("Error: Username is already taken!"));
    }
    let id = state.users.len() as i64 + 1;
    state.users.insert(
        body.username,
        MockUser {
            id,
            password: body.password,
            email: body.email,
        },
    );
    (200, message("User registered successfully!"))
}

fn authenticate(request: &Request, state: &MockState) -> Option<String> {
    let header = request.headers.get("authorization")?;
    let token = header.strip_prefix("Bearer ")?;
    let username = token.strip_prefix("token-")?;
    state
        .users
        .contains_key(username)
        .then(|| username.to_string())
}

fn tasks(request: &Request, owner: &str, state: &mut MockState) -> (u16, String) {
    let rest = request.path.trim_start_matches("/api/tasks");
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("GET", []) => {
            let list: Vec<&Task> = owned(state, owner).collect();
            (200, to_json(&list))
        }
        ("POST", []) => {
            let Ok(fields) = serde_json::from_slice::<TaskFields>(&request.body) else {
                return (400, message("Invalid task"));
            };
            let id = state.next_task_id;
            state.next_task_id += 1;
            let task = apply_fields(Task::new(id, ""), fields);
            state.tasks.push((owner.to_string(), task.clone()));
            (200, to_json(&task))
        }
        ("GET", ["overdue"]) => {
            let now = Utc::now();
            let list: Vec<&Task> = owned(state, owner).filter(|t| t.is_overdue(now)).collect();
            (200, to_json(&list))
        }
        (method, [id]) => {
            let Ok(id) = id.parse::<i64>() else {
                return (400, message("Invalid id"));
            };
            let Some(index) = find(state, owner, id) else {
                return (404, message("Task not found"));
            };
            match method {
                "GET" => (200, to_json(&state.tasks[index].1)),
                "PUT" => {
                    let Ok(fields) = serde_json::from_slice::<TaskFields>(&request.body) else {
                        return (400, message("Invalid task"));
                    };
                    let current = state.tasks[index].1.clone();
                    let updated = apply_fields(current, fields);
                    state.tasks[index].1 = updated.clone();
                    (200, to_json(&updated))
                }
                "DELETE" => {
                    state.tasks.remove(index);
                    (200, message("Task deleted successfully!"))
                }
                _ => (405, message("Method not allowed")),
            }
        }
        ("PATCH", [id, "status"]) => {
            let status = request
                .query
                .split('&')
                .find_map(|pair| pair.strip_prefix("status="))
                .and_then(|s| s.parse::<TaskStatus>().ok());
            let (Ok(id), Some(status)) = (id.parse::<i64>(), status) else {
                return (400, message("Invalid status update"));
            };
            let Some(index) = find(state, owner, id) else {
                return (404, message("Task not found"));
            };
            state.tasks[index].1.status = status;
            (200, to_json(&state.tasks[index].1))
        }
        _ => (404, message("Not found")),
    }
}

fn owned<'a>(state: &'a MockState, owner: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
    state
        .tasks
        .iter()
        .filter(move |(o, _)| o == owner)
        .map(|(_, t)| t)
}

fn find(state: &MockState, owner: &str, id: i64) -> Option<usize> {
    state
        .tasks
        .iter()
        .position(|(o, t)| o == owner && t.id == id)
}

fn apply_fields(mut task: Task, fields: TaskFields) -> Task {
    task.title = fields.title;
    task.description = fields.description;
    task.status = fields.status;
    task.priority = fields.priority;
    if fields.deadline.is_some() {
        task.deadline = fields.deadline;
    }
    task
}

fn message(text: &str) -> String {
    json!({ "message": text }).to_string()
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockTaskServer::start(MockConfig::default()).unwrap();
        assert!(server.port() > 0);
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
    }

    #[test]
    fn test_apply_fields_keeps_deadline_when_absent() {
        let mut task = Task::new(1, "old");
        task.deadline = Some(Utc::now());
        let updated = apply_fields(task.clone(), TaskFields::new("new"));
        assert_eq!(updated.title, "new");
        assert_eq!(updated.deadline, task.deadline);
    }
}
