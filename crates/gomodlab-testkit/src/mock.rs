//! Fake module proxy on a mockito server
//!
//! Each helper returns an un-created [`Mock`] so tests can add
//! expectations before registering it:
//!
//! ```no_run
//! use gomodlab_testkit::FakeProxy;
//!
//! let mut proxy = FakeProxy::new();
//! let zip = proxy.zip("example.com/mod", "v1.0.0", b"PK").expect(1).create();
//! // ... run code against proxy.url() ...
//! zip.assert();
//! ```

use mockito::{Mock, Server, ServerGuard};

pub struct FakeProxy {
    server: ServerGuard,
}

impl Default for FakeProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProxy {
    pub fn new() -> Self {
        Self {
            server: Server::new(),
        }
    }

    /// Base URL to hand to the proxy client
    pub fn url(&self) -> String {
        self.server.url()
    }

    pub fn server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    /// `GET /<module>/@v/list`
    pub fn versions(&mut self, encoded_module: &str, versions: &[&str]) -> Mock {
        let mut body = versions.join("\n");
        body.push('\n');
        self.server
            .mock("GET", format!("/{}/@v/list", encoded_module).as_str())
            .with_status(200)
            .with_body(body)
    }

    /// `GET /<module>/@latest`
    pub fn latest(&mut self, encoded_module: &str, version: &str) -> Mock {
        self.server
            .mock("GET", format!("/{}/@latest", encoded_module).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"Version":"{}","Time":"2025-06-01T00:00:00Z"}}"#,
                version
            ))
    }

    /// `GET /<module>/@v/<version>.mod`
    pub fn go_mod(&mut self, encoded_module: &str, version: &str, content: &str) -> Mock {
        self.server
            .mock("GET", format!("/{}/@v/{}.mod", encoded_module, version).as_str())
            .with_status(200)
            .with_body(content)
    }

    /// `GET /<module>/@v/<version>.zip`
    pub fn zip(&mut self, encoded_module: &str, version: &str, data: &[u8]) -> Mock {
        self.server
            .mock("GET", format!("/{}/@v/{}.zip", encoded_module, version).as_str())
            .with_status(200)
            .with_header("content-type", "application/zip")
            .with_body(data)
    }

    /// Any `path` answered with `status` and an empty body
    pub fn status(&mut self, path: &str, status: usize) -> Mock {
        self.server.mock("GET", path).with_status(status)
    }
}
