// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT

/// End-to-end coverage across listing resolution, allow-list gating, and
/// the session/pipeline lifecycle, using real child processes against
/// `tempfile::tempdir()` — mirroring `sven-tools/tests/gdb_integration.rs`'s
/// use of real subprocesses rather than mocks.
mod pipeline_lifecycle {
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use tailon_core::catalog::CommandSpec;
    use tailon_core::filespec::parse_filespec;
    use tailon_core::listing::ListEntry;
    use tailon_core::session::{Session, SessionContext};
    use tailon_core::{AllowList, Catalog};

    fn catalog() -> Catalog {
        let mut commands = HashMap::new();
        commands.insert(
            "cat".to_string(),
            CommandSpec {
                stdin: String::new(),
                action: vec!["cat".into(), "$path".into()],
                default: String::new(),
            },
        );
        commands.insert(
            "grep".to_string(),
            CommandSpec {
                stdin: "cat".to_string(),
                action: vec!["grep".into(), "--line-buffered".into(), "$script".into()],
                default: ".*".into(),
            },
        );
        Catalog::new(commands, vec!["cat".into(), "grep".into()])
    }

    async fn drain_for(
        rx: &mut mpsc::Receiver<String>,
        millis: u64,
    ) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(Some(msg)) =
            tokio::time::timeout(std::time::Duration::from_millis(millis), rx.recv()).await
        {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn listing_then_command_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, "boot\nready\nerror: disk full\n").unwrap();

        let spec = parse_filespec(file.to_str().unwrap());
        let allow_list = AllowList::new();
        tailon_core::resolve_listing(std::slice::from_ref(&spec), &allow_list);
        assert!(allow_list.contains(file.to_str().unwrap()));

        let ctx = SessionContext {
            specs: Arc::new(vec![spec]),
            catalog: Arc::new(catalog()),
            allow_list,
        };

        let (tx, mut rx) = mpsc::channel(64);
        let mut session = Session::new(ctx, tx);

        session.handle_frame("list").await;
        let listing_frame = rx.recv().await.unwrap();
        assert!(listing_frame.contains("app.log"));

        let frame = format!(
            r#"{{"command":"cat","script":"","entry":{{"path":"{}","alias":"","exists":true,"size":0,"mtime":0}},"nlines":10}}"#,
            file.to_str().unwrap().replace('\\', "\\\\")
        );
        session.handle_frame(&frame).await;
        assert!(session.has_live_pipeline());

        let lines = drain_for(&mut rx, 300).await;
        assert!(lines.iter().any(|l| l.contains("ready")));

        session.close().await;
    }

    #[tokio::test]
    async fn s6_replacing_pipeline_tears_down_upstream_first() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, "alpha\nbeta\ngamma\n").unwrap();
        let path = file.to_str().unwrap().to_string();

        let allow_list = AllowList::new();
        let mut set = std::collections::HashSet::new();
        set.insert(path.clone());
        allow_list.replace(set);

        let ctx = SessionContext {
            specs: Arc::new(Vec::new()),
            catalog: Arc::new(catalog()),
            allow_list,
        };

        let (tx, mut rx) = mpsc::channel(64);
        let mut session = Session::new(ctx, tx);

        let entry = |p: &str| ListEntry {
            path: p.to_string(),
            alias: String::new(),
            exists: true,
            size: 0,
            mtime: 0,
        };

        // one-stage: exactly `cat`.
        let cmd = tailon_core::FrontendCommand {
            command: "cat".into(),
            script: String::new(),
            entry: entry(&path),
            nlines: 10,
        };
        let raw = serde_json::to_string(&serde_json::json!({
            "command": cmd.command,
            "script": cmd.script,
            "entry": {
                "path": cmd.entry.path, "alias": "", "exists": true, "size": 0, "mtime": 0
            },
            "nlines": cmd.nlines,
        }))
        .unwrap();
        session.handle_frame(&raw).await;
        assert!(session.has_live_pipeline());

        // two-stage: grep declares stdin="cat".
        let raw = serde_json::to_string(&serde_json::json!({
            "command": "grep",
            "script": "beta",
            "entry": {
                "path": path, "alias": "", "exists": true, "size": 0, "mtime": 0
            },
            "nlines": 10,
        }))
        .unwrap();
        session.handle_frame(&raw).await;
        assert!(session.has_live_pipeline());

        let lines = drain_for(&mut rx, 300).await;
        assert!(lines.iter().any(|l| l.contains("beta")));
        assert!(!lines.iter().any(|l| l.contains("alpha")));

        // back to one-stage: the grep pipeline is torn down, exactly one
        // child remains live.
        let raw = serde_json::to_string(&serde_json::json!({
            "command": "cat",
            "script": "",
            "entry": {
                "path": path, "alias": "", "exists": true, "size": 0, "mtime": 0
            },
            "nlines": 10,
        }))
        .unwrap();
        session.handle_frame(&raw).await;
        assert!(session.has_live_pipeline());

        session.close().await;
    }

    #[tokio::test]
    async fn command_rejected_when_path_not_in_allowlist_keeps_session_idle() {
        let ctx = SessionContext {
            specs: Arc::new(Vec::new()),
            catalog: Arc::new(catalog()),
            allow_list: AllowList::new(),
        };
        let (tx, _rx) = mpsc::channel(16);
        let mut session = Session::new(ctx, tx);

        let raw = r#"{"command":"cat","script":"","entry":{"path":"/etc/shadow","alias":"","exists":true,"size":0,"mtime":0},"nlines":10}"#;
        session.handle_frame(raw).await;
        assert!(!session.has_live_pipeline());
    }
}
