//! End-to-end scrape tests against an on-disk syslog

mod common;

use std::io::Write;

use common::{saturday_noon, scraper};
use cron_exporter::correlate::ExecutionOutcome;
use cron_exporter::metrics;
use cron_exporter::source::{ExecutionLog, MemorySchedules, SyslogFile};
use tempfile::NamedTempFile;

fn syslog(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn schedules() -> MemorySchedules {
    MemorySchedules::new()
        .with_user(
            "ops",
            [
                "*/15 9-17 * * 1-5 /usr/bin/backup.sh",
                "0 4 * * * /usr/bin/report.sh --daily",
                "0 4 * *",
            ],
        )
        .with_user("www-data", ["@hourly /usr/bin/php /srv/app/artisan schedule:run"])
}

#[test]
fn test_syslog_file_correlation() {
    let log = syslog(&[
        "Oct 16 17:45:01 web1 CRON[4242]: (ops) CMD (/usr/bin/backup.sh)",
        "2026-10-17T04:00:01.532+00:00 web1 CRON[5150]: (ops) CMD (/usr/bin/report.sh --daily)",
        "Oct 17 11:00:01 web1 sshd[77]: /usr/bin/php /srv/app/artisan schedule:run",
    ]);

    let snapshot = scraper(
        &["ops", "www-data"],
        schedules(),
        SyslogFile::new(log.path()),
    )
    .scrape_at(saturday_noon());

    assert_eq!(snapshot.total_count, 3);
    assert_eq!(snapshot.errors.parse_errors, 1);
    assert!(snapshot.log_available);

    let outcome = |command: &str| {
        snapshot
            .records
            .iter()
            .find(|r| r.command == command)
            .map(|r| r.outcome)
            .unwrap()
    };
    assert_eq!(outcome("/usr/bin/backup.sh"), ExecutionOutcome::Success);
    assert_eq!(outcome("/usr/bin/report.sh --daily"), ExecutionOutcome::Success);
    // Logged without the scheduler tag
    assert_eq!(
        outcome("/usr/bin/php /srv/app/artisan schedule:run"),
        ExecutionOutcome::Failure
    );
    assert_eq!(snapshot.success_count(), 2);
}

#[test]
fn test_missing_syslog_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let log = SyslogFile::new(dir.path().join("absent.log"));
    tokio_test::assert_err!(log.read_log("CRON"));

    let snapshot = scraper(&["ops"], schedules(), log).scrape_at(saturday_noon());

    assert!(!snapshot.log_available);
    assert_eq!(snapshot.records.len(), 2);
    assert!(snapshot
        .records
        .iter()
        .all(|r| r.outcome == ExecutionOutcome::Failure));
}

#[test]
fn test_snapshot_exposition() {
    let log = syslog(&["Oct 16 17:45:01 web1 CRON[4242]: (ops) CMD (/usr/bin/backup.sh)"]);
    let snapshot = scraper(&["ops", "nobody"], schedules(), SyslogFile::new(log.path()))
        .scrape_at(saturday_noon());

    let text = tokio_test::assert_ok!(metrics::encode_snapshot(&snapshot));

    assert!(text.contains("cron_total_crons 2"));
    assert!(text.contains("cron_parse_errors 1"));
    assert!(text.contains("cron_user_errors 1"));

    let status: Vec<&str> = text.lines().filter(|l| l.starts_with("cron_status{")).collect();
    assert_eq!(status.len(), 2);

    let backup = status.iter().find(|l| l.contains("backup.sh")).unwrap();
    assert!(backup.contains(r#"nextrun="2026-10-19 09:00""#));
    assert!(backup.contains(r#"previousrun="2026-10-16 17:45""#));
    assert!(backup.contains(r#"readable="every 15 minutes between 09:00 and 17:59 on Monday through Friday""#));
    assert!(backup.ends_with(" 1"));
}
