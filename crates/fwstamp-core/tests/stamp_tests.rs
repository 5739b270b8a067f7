//! End-to-end stamping tests: fake queries, captured logs, and real git
//! repositories created in temp directories.

use fwstamp_core::{
    FlagList, GitDescribe, QueryError, StampError, StampOptions, VersionFlagProvider,
    compute_firmware_version_flag,
};
use fwstamp_test_utils::capture::LogCapture;
use fwstamp_test_utils::config::TestConfigBuilder;
use fwstamp_test_utils::query::FakeQuery;
use fwstamp_test_utils::repo::GitRepo;
use pretty_assertions::assert_eq;
use tracing::Level;

// ── Fake query ────────────────────────────────────────────────────

#[test]
fn test_single_append_with_one_flag() {
    let query = FakeQuery::output("v1.2.0-14-gabc1234\n");
    let mut env = FlagList::with_flags(vec!["-Os".to_string(), "-Wall".to_string()]);

    let flag = compute_firmware_version_flag(&query, &mut env).unwrap();

    assert_eq!(flag, r#"-D FWVERSION=\"v1.2.0-14-gabc1234\""#);
    assert_eq!(env.append_calls(), 1);
    assert_eq!(env.flags(), ["-Os", "-Wall", flag.as_str()]);
    assert_eq!(query.calls(), 1);
}

#[test]
fn test_log_line_uses_same_trimmed_value_as_flag() {
    let (reader, _guard) = LogCapture::install();
    let query = FakeQuery::output("\n  v0.9.1-2-g00ff00a  \n");

    let flag = compute_firmware_version_flag(&query, &mut FlagList::new()).unwrap();

    assert_eq!(
        reader.messages_at(Level::INFO),
        vec!["Firmware Revision: v0.9.1-2-g00ff00a".to_string()]
    );
    assert_eq!(flag, r#"-D FWVERSION=\"v0.9.1-2-g00ff00a\""#);
}

#[test]
fn test_flag_always_wrapped_in_escaped_quotes() {
    for output in ["v1.0.0-0-gabc1234", "weird output", "a\"b", "x\\y"] {
        let query = FakeQuery::output(output);
        let flag = compute_firmware_version_flag(&query, &mut FlagList::new()).unwrap();
        assert!(flag.starts_with(r#"-D FWVERSION=\""#), "{flag}");
        assert!(flag.ends_with(r#"\""#), "{flag}");
    }
}

#[test]
fn test_no_tags_is_fatal() {
    let (reader, _guard) = LogCapture::install();
    let query = FakeQuery::no_tags();
    let mut env = FlagList::new();

    let err = compute_firmware_version_flag(&query, &mut env).unwrap_err();

    assert!(matches!(
        err,
        StampError::VersionQuery(QueryError::Status { .. })
    ));
    let StampError::VersionQuery(source) = &err else {
        unreachable!()
    };
    assert!(source.to_string().contains("No names found"));
    assert!(env.is_empty());
    assert!(reader.messages_at(Level::INFO).is_empty());
}

#[test]
fn test_missing_vcs_is_fatal() {
    let query = FakeQuery::not_installed();
    let err = compute_firmware_version_flag(&query, &mut FlagList::new()).unwrap_err();
    assert!(matches!(err, StampError::VersionQuery(QueryError::Spawn { .. })));
}

#[test]
fn test_empty_output_fatal_unless_allowed() {
    let query = FakeQuery::output("   \n");
    let err = compute_firmware_version_flag(&query, &mut FlagList::new()).unwrap_err();
    assert!(matches!(err, StampError::EmptyDescribeOutput));

    let config = TestConfigBuilder::new().allow_empty(true).build();
    let provider = VersionFlagProvider::with_options(&query, StampOptions::from_config(&config));
    let flag = provider.compute_firmware_version_flag(&mut FlagList::new()).unwrap();
    assert_eq!(flag, r#"-D FWVERSION=\"\""#);
}

#[test_log::test]
fn test_malformed_output_warns_in_lenient_mode() {
    let (reader, _guard) = LogCapture::install();
    let query = FakeQuery::output("deadbeef");

    let flag = compute_firmware_version_flag(&query, &mut FlagList::new()).unwrap();

    assert_eq!(flag, r#"-D FWVERSION=\"deadbeef\""#);
    assert_eq!(reader.messages_at(Level::WARN).len(), 1);
}

// ── Real git ──────────────────────────────────────────────────────

#[test]
fn test_exact_tag_in_real_repository() {
    let Some(repo) = GitRepo::with_commit() else {
        return;
    };
    repo.tag("v1.0.0");

    let query = GitDescribe::new().in_dir(repo.path());
    let flag = compute_firmware_version_flag(query, &mut FlagList::new()).unwrap();

    let expected = format!(r#"-D FWVERSION=\"v1.0.0-0-g{}\""#, repo.short_hash());
    assert_eq!(flag, expected);
}

#[test]
fn test_distance_counts_commits_since_tag() {
    let Some(repo) = GitRepo::with_commit() else {
        return;
    };
    repo.tag("v2.0.0-rc1");
    repo.commit("second");
    repo.commit("third");

    let query = GitDescribe::new().in_dir(repo.path());
    let provider = VersionFlagProvider::new(query);
    let version = provider.describe_version().unwrap();
    let parts = version.parts().unwrap();

    assert_eq!(parts.tag, "v2.0.0-rc1");
    assert_eq!(parts.distance, 2);
    assert_eq!(parts.hash, repo.short_hash());
    assert!(!parts.dirty);
}

#[test]
fn test_untagged_repository_fails_fast() {
    let Some(repo) = GitRepo::with_commit() else {
        return;
    };

    let query = GitDescribe::new().in_dir(repo.path());
    let mut env = FlagList::new();
    let err = compute_firmware_version_flag(query, &mut env).unwrap_err();

    assert!(matches!(
        err,
        StampError::VersionQuery(QueryError::Status { .. })
    ));
    assert_eq!(env.append_calls(), 0);
}

#[test]
fn test_not_a_repository_fails() {
    if !GitRepo::git_available() {
        return;
    }
    let dir = tempfile::TempDir::new().unwrap();
    let query = GitDescribe::new().in_dir(dir.path());
    let err = compute_firmware_version_flag(query, &mut FlagList::new()).unwrap_err();
    assert!(matches!(err, StampError::VersionQuery(_)));
}

#[test]
fn test_repeated_calls_are_byte_identical() {
    let Some(repo) = GitRepo::with_commit() else {
        return;
    };
    repo.tag("v3.1.4");
    repo.commit("after tag");

    let provider = VersionFlagProvider::new(GitDescribe::new().in_dir(repo.path()));
    let first = provider.compute_firmware_version_flag(&mut FlagList::new()).unwrap();
    let second = provider.compute_firmware_version_flag(&mut FlagList::new()).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_config_match_pattern_and_dirty() {
    let Some(repo) = GitRepo::with_commit() else {
        return;
    };
    repo.tag("fw-1.0");
    repo.commit("between");
    repo.tag("docs-2024");
    repo.make_dirty();

    let config = TestConfigBuilder::new()
        .repo_dir(repo.path())
        .match_pattern("fw-*")
        .dirty(true)
        .strict(true)
        .build();
    let provider = VersionFlagProvider::with_options(
        GitDescribe::from_config(&config.describe),
        StampOptions::from_config(&config),
    );

    let version = provider.describe_version().unwrap();
    let parts = version.parts().unwrap();
    assert_eq!(parts.tag, "fw-1.0");
    assert_eq!(parts.distance, 1);
    assert!(parts.dirty);
}

#[test]
fn test_configured_macro_and_style() {
    let config = TestConfigBuilder::new()
        .macro_name("APP_VERSION")
        .style("compact")
        .build();
    let query = FakeQuery::output("v5.0.0-7-gc0ffee1");
    let provider = VersionFlagProvider::with_options(&query, StampOptions::from_config(&config));

    let flag = provider.compute_firmware_version_flag(&mut FlagList::new()).unwrap();
    assert_eq!(flag, r#"-DAPP_VERSION=\"v5.0.0-7-gc0ffee1\""#);
}

#[test]
fn test_configured_program_missing() {
    let config = TestConfigBuilder::new()
        .program("fwstamp-test-missing-vcs")
        .build();
    let err = compute_firmware_version_flag(
        GitDescribe::from_config(&config.describe),
        &mut FlagList::new(),
    )
    .unwrap_err();
    assert!(matches!(err, StampError::VersionQuery(QueryError::Spawn { .. })));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("fwstamp-test-missing-vcs"));
}

// ── Scripted VCS ──────────────────────────────────────────────────

#[cfg(unix)]
#[test]
fn test_non_utf8_output_is_encoding_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let script = dir.path().join("fake-git");
    std::fs::write(&script, "#!/bin/sh\nprintf 'v1.0.0-0-g\\377abc\\n'\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let query = GitDescribe::new().with_program(script.to_string_lossy());
    let mut env = FlagList::with_flags(vec!["-Os".to_string()]);
    let err = compute_firmware_version_flag(query, &mut env).unwrap_err();

    assert!(matches!(
        err,
        StampError::VersionQuery(QueryError::Encoding { .. })
    ));
    assert_eq!(env.flags(), ["-Os"]);
    assert_eq!(env.append_calls(), 0);
}
