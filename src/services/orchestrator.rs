use crate::domain::{
    RawRow, Record, RunSummary, SourceDescriptor, TableSchema, YearReport, YearStage,
};
use crate::error::{Result, ScrapeError};
use crate::infrastructure::{BrowserLauncher, FileSystemStore, Session};
use crate::services::extraction::extract;
use crate::services::pagination::expand;
use crate::services::validation::{validate, NumericPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{info, trace, warn};

/// Drives every (source, year) pair through navigate, expand, extract,
/// validate and persist on one shared session.
pub struct Orchestrator {
    store: FileSystemStore,
    policy: NumericPolicy,
    strict: bool,
}

impl Orchestrator {
    pub fn new(store: FileSystemStore, strict: bool) -> Self {
        let policy = if strict {
            NumericPolicy::Strict
        } else {
            NumericPolicy::Lenient
        };
        Self {
            store,
            policy,
            strict,
        }
    }

    /// Acquires the session, runs every source and always releases the
    /// session before writing the run summary. Only a launch failure or a
    /// summary write failure is returned as an error.
    pub async fn scrape_all(
        &self,
        launcher: &dyn BrowserLauncher,
        sources: &[SourceDescriptor],
        years: &[u16],
    ) -> Result<RunSummary> {
        let mut session = Session::acquire(launcher).await?;

        let mut reports = Vec::new();
        for source in sources {
            reports.extend(self.run(&mut session, source, years).await);
        }

        // Teardown problems are logged by the session; the scraped years stand.
        let _ = session.release().await;

        let summary = RunSummary::new(reports);
        let path = self.store.save_summary(&summary)?;
        info!("Run summary written to {}", path.display());
        Ok(summary)
    }

    /// Scrapes one source for each year in order. A failing year is logged and
    /// reported; the next year still runs.
    pub async fn run(
        &self,
        session: &mut Session,
        source: &SourceDescriptor,
        years: &[u16],
    ) -> Vec<YearReport> {
        info!("Scraping {} for {} years", source.key, years.len());

        let pb = ProgressBar::new(years.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut reports = Vec::with_capacity(years.len());
        for &year in years {
            pb.set_message(format!("{} {year}", source.key));

            let mut report = YearReport::pending(source.key, year);
            if let Err(e) = self.run_year(session, source, year, &mut report).await {
                warn!("{} {year} failed after {:?}: {e}", source.key, report.stage);
                report.fail(e);
            }

            pb.inc(1);
            reports.push(report);
        }

        pb.finish_with_message(format!("{} done", source.key));
        reports
    }

    async fn run_year(
        &self,
        session: &mut Session,
        source: &SourceDescriptor,
        year: u16,
        report: &mut YearReport,
    ) -> Result<()> {
        let url = source.url(year);
        session.navigate(&url, &source.load).await?;
        report.advance(YearStage::Navigated);

        if let Some(pagination) = &source.pagination {
            report.expansions = expand(session, pagination).await?;
        }
        report.advance(YearStage::Expanded);

        let rows = extract(session, source).await?;
        report.rows_seen = rows.len();
        report.advance(YearStage::Extracted);

        let expected = source.schema.width();
        if let Some(found) = dominant_width_mismatch(&rows, source.schema) {
            let mismatch = ScrapeError::SchemaMismatch {
                source_key: source.key.to_string(),
                expected,
                found,
            };
            // A narrower table cannot fill the mapped columns; a wider one is
            // caught below if strict decoding rejects every row.
            if self.strict && found < expected {
                return Err(mismatch);
            }
            warn!("{year}: {mismatch}");
            report.schema_warning = Some(mismatch.to_string());
        }

        let records = self.filter(&rows, source, report);
        report.records = records.len();

        if self.strict && records.is_empty() && report.rejected.unparsable > 0 {
            return Err(ScrapeError::UndecodableTable {
                source_key: source.key.to_string(),
                rejected: report.rejected.unparsable,
            });
        }
        report.advance(YearStage::Validated);
        info!(
            "{} {year}: {} records from {} rows ({} rejected, {} coerced fields, {} duplicates)",
            source.key,
            report.records,
            report.rows_seen,
            report.rejected.total(),
            report.coerced_fields,
            report.duplicates
        );

        if records.is_empty() && !source.write_empty {
            info!("{} {year}: nothing to write, previous artifact kept", source.key);
            return Ok(());
        }

        let path = self
            .store
            .write_batch(&source.artifact_name(year), &records)?;
        info!("Saved {} {year} to {}", source.key, path.display());
        report.artifact = Some(path.display().to_string());
        report.advance(YearStage::Persisted);

        Ok(())
    }

    fn filter(
        &self,
        rows: &[RawRow],
        source: &SourceDescriptor,
        report: &mut YearReport,
    ) -> Vec<Record> {
        let mut records = Vec::new();
        let mut seen = FxHashSet::default();

        for (i, row) in rows.iter().enumerate() {
            match validate(row, source, self.policy) {
                Ok(validated) => {
                    report.coerced_fields += validated.coerced;
                    if let Ok(key) = serde_json::to_string(&validated.record) {
                        if !seen.insert(key) {
                            report.duplicates += 1;
                        }
                    }
                    records.push(validated.record);
                }
                Err(reason) => {
                    trace!("row {i} rejected: {reason}");
                    report.rejected.record(&reason);
                }
            }
        }

        records
    }
}

/// Most common cell count among rows that reach the minimum, when it differs
/// from the number of columns the schema maps.
fn dominant_width_mismatch(rows: &[RawRow], schema: &TableSchema) -> Option<usize> {
    let mut widths: FxHashMap<usize, usize> = FxHashMap::default();
    for row in rows.iter().filter(|r| r.len() >= schema.min_cells) {
        *widths.entry(row.len()).or_default() += 1;
    }

    widths
        .into_iter()
        .max_by_key(|&(width, count)| (count, width))
        .map(|(width, _)| width)
        .filter(|&width| width != schema.width())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordKind, SourceKey, DEFAULT_TEAM};
    use crate::infrastructure::browser::fake::{FakeLauncher, FakePage};
    use crate::infrastructure::ControlState;
    use std::fs;
    use std::path::Path;

    fn source(key: SourceKey, host: &str) -> SourceDescriptor {
        let mut source = SourceDescriptor::builtin(key, DEFAULT_TEAM);
        source.url_template = format!("https://{host}/{{year}}");
        source.scale_delays(0.0);
        source
    }

    fn page(rows: &[String]) -> String {
        format!("<html><body><table><tbody>{}</tbody></table></body></html>", rows.concat())
    }

    fn team_row(first: &str, team: &str) -> String {
        let cells: String = (0..40)
            .map(|i| match i {
                0 => format!("<td>{first}</td>"),
                1 => format!("<td>{team}</td>"),
                5 => "<td>20-10</td>".to_string(),
                _ => format!("<td>{i}</td>"),
            })
            .collect();
        format!("<tr>{cells}</tr>")
    }

    fn player_row(rank: usize, name: &str) -> String {
        let cells: String = (0..44)
            .map(|i| match i {
                0 => format!("<td>{rank}</td>"),
                4 => format!("<td><a href=\"playerstat.php?p={rank}\">{name}</a></td>"),
                6 => "<td><a href=\"team.php\">Illinois</a></td>".to_string(),
                7 => "<td><a href=\"conf.php\">B10</a></td>".to_string(),
                _ => "<td>1</td>".to_string(),
            })
            .collect();
        format!("<tr>{cells}</tr>")
    }

    fn roster_page(names: &[&str]) -> String {
        let rows: String = names
            .iter()
            .map(|name| {
                format!(
                    "<tr><td>1</td><td>2</td><td><div>#1</div><div>So</div></td><td>6-5</td>\
                     <td><a href=\"p\">{name}</a></td><td>50</td><td>Illinois</td><td>B10</td>\
                     <td>30</td><td>Wing F</td></tr>"
                )
            })
            .collect();
        format!("<div class=\"teamFive\"><table><tbody>{rows}</tbody></table></div>")
    }

    fn team_pages(host: &str) -> FakeLauncher {
        FakeLauncher::new()
            .page(
                &format!("https://{host}/2022"),
                FakePage::html(&page(&[team_row("", "Team"), team_row("1", "Houston")])),
            )
            .page(&format!("https://{host}/2023"), FakePage::unreachable())
            .page(
                &format!("https://{host}/2024"),
                FakePage::html(&page(&[team_row("1", "Auburn"), team_row("2", "Duke")])),
            )
    }

    fn artifact(dir: &Path, name: &str) -> std::path::PathBuf {
        dir.join(name)
    }

    #[tokio::test]
    async fn failed_year_does_not_stop_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = team_pages("t.test");
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);

        let summary = orchestrator
            .scrape_all(
                &launcher,
                &[source(SourceKey::TeamData, "t.test")],
                &[2022, 2023, 2024],
            )
            .await
            .unwrap();

        let stages: Vec<_> = summary.years.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![YearStage::Persisted, YearStage::Failed, YearStage::Persisted]
        );
        assert_eq!(summary.years[1].failed_after, Some(YearStage::Pending));
        assert_eq!(summary.years[0].records, 1);
        assert_eq!(summary.years[0].rejected.header_row, 1);
        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.years_failed, 1);

        assert!(artifact(tmp.path(), "team-data-2022.json").exists());
        assert!(!artifact(tmp.path(), "team-data-2023.json").exists());
        assert!(artifact(tmp.path(), "team-data-2024.json").exists());
        assert!(artifact(tmp.path(), "run-summary.json").exists());

        assert_eq!(launcher.events().last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn persisted_batch_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(tmp.path());
        let orchestrator = Orchestrator::new(store.clone(), false);

        orchestrator
            .scrape_all(
                &team_pages("t.test"),
                &[source(SourceKey::TeamData, "t.test")],
                &[2024],
            )
            .await
            .unwrap();

        let batch = store
            .read_batch("team-data-2024.json", RecordKind::TeamSeasonStats)
            .unwrap()
            .unwrap();
        let names: Vec<_> = batch.iter().map(Record::name).collect();
        assert_eq!(names, vec!["Auburn", "Duke"]);
        match &batch[0] {
            Record::TeamSeason(team) => {
                assert_eq!(team.record, "20-10");
                assert_eq!(team.wins, 6);
                assert_eq!(team.adj_oe, 2.0);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[tokio::test]
    async fn identical_runs_write_identical_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = [source(SourceKey::TeamData, "t.test")];
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);
        let path = artifact(tmp.path(), "team-data-2024.json");

        orchestrator
            .scrape_all(&team_pages("t.test"), &sources, &[2024])
            .await
            .unwrap();
        let first = fs::read(&path).unwrap();

        orchestrator
            .scrape_all(&team_pages("t.test"), &sources, &[2024])
            .await
            .unwrap();
        assert_eq!(first, fs::read(&path).unwrap());
    }

    #[tokio::test]
    async fn launch_failure_aborts_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);

        let result = orchestrator
            .scrape_all(
                &FakeLauncher::new().failing(),
                &[source(SourceKey::TeamData, "t.test")],
                &[2024],
            )
            .await;

        assert!(matches!(result, Err(ScrapeError::Launch(_))));
        assert!(!artifact(tmp.path(), "run-summary.json").exists());
    }

    #[tokio::test]
    async fn expands_before_extracting() {
        let tmp = tempfile::tempdir().unwrap();
        let states = vec![
            page(&[player_row(1, "Jaylen Clark")]),
            page(&[player_row(1, "Jaylen Clark"), player_row(2, "Hunter Dickinson")]),
        ];
        let launcher = FakeLauncher::new().page(
            "https://p.test/2024",
            FakePage::growing(states, vec![ControlState::Ready]),
        );
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);

        let summary = orchestrator
            .scrape_all(
                &launcher,
                &[source(SourceKey::TransferPlayers, "p.test")],
                &[2024],
            )
            .await
            .unwrap();

        let report = &summary.years[0];
        assert_eq!(report.expansions, 1);
        assert_eq!(report.records, 2);
        assert_eq!(report.stage, YearStage::Persisted);
    }

    #[tokio::test]
    async fn duplicate_rows_are_counted_not_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let html = page(&[player_row(1, "Jaylen Clark"), player_row(1, "Jaylen Clark")]);
        let launcher = FakeLauncher::new().page("https://p.test/2025", FakePage::html(&html));
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);

        let summary = orchestrator
            .scrape_all(
                &launcher,
                &[source(SourceKey::TransferPlayers, "p.test")],
                &[2025],
            )
            .await
            .unwrap();

        assert_eq!(summary.years[0].records, 2);
        assert_eq!(summary.years[0].duplicates, 1);
    }

    #[tokio::test]
    async fn empty_portal_batch_keeps_previous_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let previous = artifact(tmp.path(), "transfers-247sports-2025.json");
        fs::write(&previous, "[]").unwrap();

        let launcher = FakeLauncher::new().page(
            "https://portal.test/2025",
            FakePage::html("<ul class=\"transfer-list\"></ul>"),
        );
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);

        let summary = orchestrator
            .scrape_all(
                &launcher,
                &[source(SourceKey::TransferPortal, "portal.test")],
                &[2025],
            )
            .await
            .unwrap();

        let report = &summary.years[0];
        assert_eq!(report.stage, YearStage::Validated);
        assert_eq!(report.artifact, None);
        assert_eq!(fs::read_to_string(&previous).unwrap(), "[]");
    }

    #[tokio::test]
    async fn narrow_table_warns_unless_strict() {
        let launcher = FakeLauncher::new().page(
            "https://r.test/2024",
            FakePage::html(&roster_page(&["Terrence Shannon Jr.", "Coleman Hawkins"])),
        );
        let sources = [source(SourceKey::Roster, "r.test")];

        let tmp = tempfile::tempdir().unwrap();
        let lenient = Orchestrator::new(FileSystemStore::new(tmp.path()), false);
        let summary = lenient.scrape_all(&launcher, &sources, &[2024]).await.unwrap();
        let report = &summary.years[0];
        assert_eq!(report.stage, YearStage::Persisted);
        assert_eq!(report.records, 2);
        assert!(report.schema_warning.is_some());

        let tmp = tempfile::tempdir().unwrap();
        let strict = Orchestrator::new(FileSystemStore::new(tmp.path()), true);
        let summary = strict.scrape_all(&launcher, &sources, &[2024]).await.unwrap();
        let report = &summary.years[0];
        assert_eq!(report.stage, YearStage::Failed);
        assert_eq!(report.failed_after, Some(YearStage::Extracted));
        assert!(report
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Schema mismatch")));
        assert!(!artifact(tmp.path(), "illinois-roster-2024.json").exists());
    }

    #[test]
    fn dominant_width_ignores_short_rows() {
        let rows = vec![
            RawRow::from_texts(&["a"; 3]),
            RawRow::from_texts(&["a"; 3]),
            RawRow::from_texts(&["a"; 3]),
            RawRow::from_texts(&["a"; 40]),
        ];
        assert_eq!(
            dominant_width_mismatch(&rows, &crate::domain::schema::TEAM_DATA),
            None
        );

        let rows = vec![RawRow::from_texts(&["a"; 12]), RawRow::from_texts(&["a"; 12])];
        assert_eq!(
            dominant_width_mismatch(&rows, &crate::domain::schema::ROSTER),
            Some(12)
        );

        let rows = vec![RawRow::from_texts(&["a"; 41]), RawRow::from_texts(&["a"; 40])];
        assert_eq!(
            dominant_width_mismatch(&rows, &crate::domain::schema::TEAM_DATA),
            Some(41)
        );
    }

    /// Team rows with a conference column inserted at index 2, shifting every
    /// later field by one.
    fn shifted_team_page(teams: &[&str]) -> String {
        let rows: Vec<String> = teams
            .iter()
            .map(|team| {
                let cells: String = (0..41)
                    .map(|i| match i {
                        0 => "<td>1</td>".to_string(),
                        1 => format!("<td>{team}</td>"),
                        2 => "<td>Big 12</td>".to_string(),
                        6 => "<td>20-10</td>".to_string(),
                        _ => format!("<td>{i}</td>"),
                    })
                    .collect();
                format!("<tr>{cells}</tr>")
            })
            .collect();
        page(&rows)
    }

    #[tokio::test]
    async fn wider_table_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new().page(
            "https://t.test/2024",
            FakePage::html(&shifted_team_page(&["Houston", "Iowa State"])),
        );
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), false);

        let summary = orchestrator
            .scrape_all(&launcher, &[source(SourceKey::TeamData, "t.test")], &[2024])
            .await
            .unwrap();

        let report = &summary.years[0];
        assert_eq!(report.stage, YearStage::Persisted);
        assert_eq!(report.records, 2);
        assert_eq!(report.coerced_fields, 2);
        assert!(report
            .schema_warning
            .as_deref()
            .is_some_and(|w| w.contains("page rows carry 41")));
    }

    #[tokio::test]
    async fn strict_run_keeps_previous_artifact_when_no_row_decodes() {
        let tmp = tempfile::tempdir().unwrap();
        let previous = artifact(tmp.path(), "team-data-2024.json");
        fs::write(&previous, "[{\"team\": \"Houston\"}]").unwrap();

        let launcher = FakeLauncher::new().page(
            "https://t.test/2024",
            FakePage::html(&shifted_team_page(&["Houston", "Iowa State"])),
        );
        let orchestrator = Orchestrator::new(FileSystemStore::new(tmp.path()), true);

        let summary = orchestrator
            .scrape_all(&launcher, &[source(SourceKey::TeamData, "t.test")], &[2024])
            .await
            .unwrap();

        let report = &summary.years[0];
        assert_eq!(report.stage, YearStage::Failed);
        assert_eq!(report.failed_after, Some(YearStage::Extracted));
        assert_eq!(report.rejected.unparsable, 2);
        assert!(report.schema_warning.is_some());
        assert!(report
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Schema mismatch")));
        assert_eq!(
            fs::read_to_string(&previous).unwrap(),
            "[{\"team\": \"Houston\"}]"
        );
    }
}
