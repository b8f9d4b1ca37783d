use quiz_insights::config::Endpoints;
use quiz_insights::error::RetrievalError;
use quiz_insights::fetch::{BasicClient, retrieve_all};
use quiz_insights::pipeline::{self, Tables};
use quiz_insights::plots::{
    ChartData, LogRenderer, SvgRenderer, plan_distribution_charts, plan_group_charts, render_all,
};
use quiz_insights::report::RunSummary;
use quiz_insights::stats::{Aggregation, performance_breakdowns};
use quiz_insights::table::{Cell, ColumnKind};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture_endpoints() -> Endpoints {
    Endpoints {
        current_quiz: fixture("current_quiz.json"),
        submissions: fixture("submissions.json"),
        historical_quiz: fixture("historical_quiz.json"),
    }
}

#[tokio::test]
async fn test_full_pipeline() {
    let client = BasicClient::insecure().expect("client");
    let raw = retrieve_all(&client, &fixture_endpoints())
        .await
        .expect("Failed to retrieve fixtures");
    let loaded = Tables::load(&raw).expect("Failed to load tables");
    let cleaned = pipeline::clean(loaded.clone());

    // Row counts never change
    assert_eq!(cleaned.current_quiz.row_count(), 4);
    assert_eq!(cleaned.historical_quiz.row_count(), 4);

    // Numeric fill: (32 + 41 + 19) / 3
    let time_taken = cleaned.current_quiz.column("time_taken").unwrap();
    assert_eq!(time_taken.cells()[1], Cell::Float(92.0 / 3.0));

    let flags = cleaned.current_quiz.column("correct_answer").unwrap();
    assert_eq!(
        flags.cells(),
        &[Cell::Int(1), Cell::Int(0), Cell::Int(1), Cell::Int(0)]
    );

    // Text columns keep their gaps
    let selected = cleaned.current_quiz.column("selected_option").unwrap();
    assert_eq!(selected.missing_count(), 1);

    let accuracy = cleaned.historical_quiz.column("accuracy_numeric").unwrap();
    assert_eq!(accuracy.kind(), ColumnKind::Numeric);
    assert_eq!(
        accuracy.cells(),
        &[Cell::Float(90.0), Cell::Missing, Cell::Float(75.0), Cell::Float(80.0)]
    );

    let rank = cleaned.historical_quiz.column("rank_numeric").unwrap();
    assert_eq!(
        rank.cells(),
        &[Cell::Float(12.0), Cell::Missing, Cell::Float(-3.0), Cell::Float(1.0)]
    );

    assert!(cleaned.submissions.has_column("quiz.meta.questions"));
    assert_eq!(cleaned.submissions, loaded.submissions);

    let summary = RunSummary::new(&fixture_endpoints(), &loaded, &cleaned);
    assert_eq!(
        summary.derived_columns,
        vec![
            "current_quiz.correct_answer",
            "historical_quiz.accuracy_numeric",
            "historical_quiz.rank_numeric",
        ]
    );
}

#[tokio::test]
async fn test_grouped_means_and_charts() {
    let client = BasicClient::insecure().expect("client");
    let raw = retrieve_all(&client, &fixture_endpoints()).await.unwrap();
    let cleaned = pipeline::clean(Tables::load(&raw).unwrap());

    let breakdowns = performance_breakdowns(&cleaned.historical_quiz);
    let Aggregation::Computed(topics) = &breakdowns[0].1 else {
        panic!("topic column is present");
    };
    // Biology: (72 + 60) / 2
    assert_eq!(topics.groups[0].mean, Some(66.0));
    // Physics: 84 and the filled mean of (72 + 60 + 84) / 3
    assert_eq!(topics.groups[1].mean, Some((84.0 + 72.0) / 2.0));
    assert_eq!(
        breakdowns[2].1,
        Aggregation::Skipped {
            missing_column: "response_accuracy".into()
        }
    );

    let mut charts = plan_distribution_charts(&cleaned.historical_quiz, 15);
    assert!(
        charts
            .iter()
            .all(|c| !matches!(c.data, ChartData::MissingHeatmap { .. }))
    );
    charts.extend(plan_group_charts(&breakdowns));
    assert_eq!(charts.len(), 6);

    let dir = tempfile::tempdir().unwrap();
    let mut renderer = SvgRenderer::new(dir.path()).unwrap();
    assert_eq!(render_all(&mut renderer, &charts).len(), 6);
    assert_eq!(render_all(&mut LogRenderer, &charts).len(), 6);
}

#[tokio::test]
async fn test_missing_source_stops_the_run() {
    let client = BasicClient::insecure().expect("client");
    let endpoints = Endpoints {
        historical_quiz: fixture("does_not_exist.json"),
        ..fixture_endpoints()
    };

    let err = retrieve_all(&client, &endpoints).await.unwrap_err();
    assert_eq!(
        err,
        RetrievalError::Incomplete {
            missing: vec!["Historical Quiz Data".into()]
        }
    );
}
