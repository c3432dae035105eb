//! Thread-safe parser pool for tree-sitter parsers.
//!
//! tree-sitter parsers are not `Send`, so each worker thread owns its own `Parser`
//! and we hand it requests over a channel — the same shape used for any
//! thread-confined resource pool, just specialised to parsing.

use std::path::PathBuf;

use anyhow::Result;
use tree_sitter::{Language, Parser};

/// Grammars the registry's plugins know how to hand to tree-sitter. `Tsx` and
/// `TypeScript` are the same language family but different grammars — JSX syntax
/// only parses under the TSX grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarId {
    TypeScript,
    Tsx,
    JavaScript,
    Python,
    CSharp,
}

impl GrammarId {
    pub fn language(self) -> Language {
        match self {
            GrammarId::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            GrammarId::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            GrammarId::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            GrammarId::Python => tree_sitter_python::LANGUAGE.into(),
            GrammarId::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }
}

pub struct ParseRequest {
    pub grammar: GrammarId,
    pub content: String,
    pub path: PathBuf,
}

pub struct ParseOutcome {
    pub tree: tree_sitter::Tree,
    pub content: String,
}

struct WorkerRequest {
    request: ParseRequest,
    response_sender: std::sync::mpsc::Sender<Result<ParseOutcome>>,
}

/// A pool of dedicated parser threads. `extractAllEntities` calls (spec §4.1) run on
/// the coordinator's async worker pool and hand parsing off to this pool via
/// `spawn_blocking`, keeping the non-`Send` `Parser` off the async task.
pub struct ParserPool {
    sender: std::sync::mpsc::Sender<WorkerRequest>,
}

impl Clone for ParserPool {
    fn clone(&self) -> Self {
        ParserPool { sender: self.sender.clone() }
    }
}

impl ParserPool {
    pub fn new(num_workers: usize) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel::<WorkerRequest>();
        let receiver = std::sync::Arc::new(std::sync::Mutex::new(receiver));

        for id in 0..num_workers.max(1) {
            let receiver = receiver.clone();
            std::thread::spawn(move || Self::worker_thread(id, receiver));
        }

        ParserPool { sender }
    }

    fn worker_thread(
        worker_id: usize,
        receiver: std::sync::Arc<std::sync::Mutex<std::sync::mpsc::Receiver<WorkerRequest>>>,
    ) {
        tracing::debug!("parser worker {worker_id} started");
        let mut parser = Parser::new();

        loop {
            let request = match receiver.lock().unwrap().recv() {
                Ok(req) => req,
                Err(_) => {
                    tracing::debug!("parser worker {worker_id} shutting down");
                    break;
                }
            };

            let WorkerRequest { request, response_sender } = request;

            let result = (|| -> Result<ParseOutcome> {
                parser
                    .set_language(&request.grammar.language())
                    .map_err(|e| anyhow::anyhow!("failed to set grammar: {e}"))?;
                let tree = parser
                    .parse(&request.content, None)
                    .ok_or_else(|| anyhow::anyhow!("failed to parse {}", request.path.display()))?;
                Ok(ParseOutcome { tree, content: request.content })
            })();

            let _ = response_sender.send(result);
        }
    }

    /// Parse on the pool's worker threads, off the calling async task.
    pub async fn parse(&self, request: ParseRequest) -> Result<ParseOutcome> {
        let sender = self.sender.clone();
        tokio::task::spawn_blocking(move || {
            let (response_sender, response_receiver) = std::sync::mpsc::channel();
            sender
                .send(WorkerRequest { request, response_sender })
                .map_err(|_| anyhow::anyhow!("parser pool is shut down"))?;
            response_receiver
                .recv()
                .map_err(|_| anyhow::anyhow!("parser worker died"))?
        })
        .await
        .map_err(|e| anyhow::anyhow!("parser task join error: {e}"))?
    }

    pub fn parse_blocking(&self, request: ParseRequest) -> Result<ParseOutcome> {
        let (response_sender, response_receiver) = std::sync::mpsc::channel();
        self.sender
            .send(WorkerRequest { request, response_sender })
            .map_err(|_| anyhow::anyhow!("parser pool is shut down"))?;
        response_receiver
            .recv()
            .map_err(|_| anyhow::anyhow!("parser worker died"))?
    }
}

/// One worker per hardware thread, floored at 2 (spec §5 default worker pool size).
pub fn create_parser_pool() -> ParserPool {
    let num_workers = std::thread::available_parallelism().map(|n| n.get().max(2)).unwrap_or(2);
    ParserPool::new(num_workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_typescript() {
        let pool = create_parser_pool();
        let outcome = pool
            .parse(ParseRequest {
                grammar: GrammarId::TypeScript,
                content: "function f() { return 1; }".to_string(),
                path: PathBuf::from("a.ts"),
            })
            .await
            .unwrap();
        assert_eq!(outcome.tree.root_node().kind(), "program");
    }

    #[tokio::test]
    async fn parses_python() {
        let pool = create_parser_pool();
        let outcome = pool
            .parse(ParseRequest {
                grammar: GrammarId::Python,
                content: "def f():\n    return 1\n".to_string(),
                path: PathBuf::from("a.py"),
            })
            .await
            .unwrap();
        assert_eq!(outcome.tree.root_node().kind(), "module");
    }
}
