// End-to-end race scenarios: event log text in, narration and report out
use biathlon_engine::{
    parse_event_log, Competitor, EngineError, MemorySink, RaceConfig, RaceEngine, Status,
};

fn config(laps: u32) -> RaceConfig {
    RaceConfig::new(laps, 3651, 50)
        .with_firing_lines(1)
        .with_start("09:30:00.000")
        .with_start_delta("00:00:30")
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run(config: RaceConfig, log: &str) -> RaceEngine<MemorySink> {
    init_logging();
    let events = parse_event_log(log.as_bytes()).unwrap();
    let mut engine = RaceEngine::new(config, MemorySink::new()).unwrap();
    let skipped = engine.process_events(&events);
    assert!(skipped.is_empty(), "unexpected skipped events: {:?}", skipped);
    engine
}

const SAMPLE_LOG: &str = "\
[09:05:59.867] 1 1
[09:15:00.841] 2 1 09:30:00.000
[09:29:45.734] 3 1
[09:30:01.005] 4 1
[09:49:31.659] 5 1 1
[09:49:33.123] 6 1 1
[09:49:34.650] 6 1 2
[09:49:35.937] 6 1 4
[09:49:37.364] 6 1 5
[09:49:38.339] 7 1
[09:49:55.915] 8 1
[09:51:48.391] 9 1
[09:59:03.872] 10 1
[09:59:03.872] 11 1 Lost in the forest
";

#[test]
fn sample_log_narration_and_report() {
    let mut engine = run(config(2), SAMPLE_LOG);
    let report = engine.generate_report();

    assert_eq!(
        report.to_string(),
        "[NotFinished] 1 [{00:29:03.872, 2.122}, {,}] {00:01:52.476, 0.445} 4/5\n"
    );

    let narration = engine.into_sink().into_lines();
    assert_eq!(narration.len(), 14);
    assert_eq!(narration[0], "[09:05:59.867] The competitor(1) registered");
    assert_eq!(
        narration[1],
        "[09:15:00.841] The start time for the competitor(1) was set by a draw to 09:30:00.000"
    );
    assert_eq!(narration[4], "[09:49:31.659] The competitor(1) is on the firing range(1)");
    assert_eq!(narration[5], "[09:49:33.123] The target(1) has been hit by competitor(1)");
    assert_eq!(narration[10], "[09:49:55.915] The competitor(1) entered the penalty laps");
    assert_eq!(narration[12], "[09:59:03.872] The competitor(1) ended the main lap");
    assert_eq!(narration[13], "[09:59:03.872] The competitor(1) can`t continue: Lost in the forest");
}

#[test]
fn happy_path_single_lap() {
    let log = "\
[09:05:59.867] 1 1
[09:15:00.841] 2 1 09:30:00.000
[09:29:45.734] 3 1
[09:30:01.005] 4 1
[09:49:31.659] 5 1 1
[09:49:33.123] 6 1 1
[09:49:34.650] 6 1 2
[09:49:35.937] 6 1 4
[09:49:37.364] 6 1 5
[09:49:38.339] 7 1
[09:59:03.872] 10 1
";
    let mut engine = run(config(1), log);

    let comp = engine.competitor(1).unwrap();
    assert_eq!(comp.status, Status::Finished);
    assert_eq!(comp.lap_results.len(), 1);
    let lap = comp.lap_results[0];
    assert_eq!(lap.duration.num_milliseconds(), 1_743_872);
    assert!((lap.speed - (3651.0 + 50.0) / 1743.872).abs() < 1e-9);
    assert_eq!(comp.total_time.unwrap().num_milliseconds(), 1_743_872);

    assert_eq!(engine.check_disqualifications().unwrap(), 0);
    let report = engine.generate_report();
    // One miss but no penalty loop served
    assert_eq!(
        report.to_string(),
        "[00:29:03.872] 1 [{00:29:03.872, 2.122}] {00:00:00.000, 0.000} 4/5\n"
    );

    let narration = engine.sink().lines();
    assert_eq!(narration.last().unwrap(), "[09:59:03.872] The competitor(1) has finished");
}

#[test]
fn late_starter_and_no_show_are_disqualified() {
    let log = "\
[09:05:59.867] 1 1
[09:15:00.841] 2 1 09:30:00.000
[09:31:00.000] 4 1
[09:06:00.000] 1 2
[09:15:01.000] 2 2 09:35:00.000
";
    let mut engine = run(config(1), log);
    assert_eq!(engine.check_disqualifications().unwrap(), 2);

    let narration = engine.sink().lines();
    assert_eq!(narration[narration.len() - 2], "[09:30:30.001] The competitor(1) is disqualified");
    assert_eq!(narration[narration.len() - 1], "[09:35:30.001] The competitor(2) is disqualified");

    let report = engine.generate_report();
    assert_eq!(
        report.to_string(),
        "[NotStarted] 1 [{,}] {,} 0/0\n[NotStarted] 2 [{,}] {,} 0/0\n"
    );
}

#[test]
fn ranking_across_outcomes() {
    let log = "\
[09:15:00.000] 2 1 09:30:00.000
[09:30:00.500] 4 1
[10:00:00.000] 10 1
[09:15:00.000] 2 2 09:31:00.000
[09:31:00.500] 4 2
[09:45:00.000] 11 2 Broken ski
[09:15:00.000] 2 5 09:32:00.000
[09:15:00.000] 2 3 09:33:00.000
[09:33:00.100] 4 3
[09:58:00.000] 10 3
";
    let mut engine = run(config(1), log);
    let report = engine.generate_report();

    let ids: Vec<_> = report.rows().iter().map(|row| row.competitor_id).collect();
    assert_eq!(ids, vec![3, 1, 2, 5]);
    let statuses: Vec<_> = report.rows().iter().map(|row| row.status).collect();
    assert_eq!(
        statuses,
        vec![Status::Finished, Status::Finished, Status::NotFinished, Status::NotStarted]
    );
}

#[test]
fn penalty_loop_speed() {
    let log = "\
[09:15:00.841] 2 1 09:30:00.000
[09:30:01.005] 4 1
[09:49:31.659] 5 1 1
[09:49:33.123] 6 1 1
[09:49:34.650] 6 1 2
[09:49:35.937] 6 1 4
[09:49:37.364] 6 1 5
[09:49:38.339] 7 1
[09:49:55.915] 8 1
[09:51:48.391] 9 1
";
    let engine = run(config(2), log);
    let comp = engine.competitor(1).unwrap();

    assert_eq!(comp.penalty_result.duration.num_milliseconds(), 112_476);
    assert!((comp.penalty_result.speed - 50.0 / 112.476).abs() < 1e-9);
    assert_eq!(comp.status, Status::LeftPenaltyLaps);
}

#[test]
fn malformed_start_time_is_skipped_and_run_continues() {
    let log = "\
[09:05:59.867] 1 1
[09:15:00.841] 2 1 nine-thirty
[09:15:00.900] 2 1 09:30:00.000
[09:30:01.005] 4 1
";
    let events = parse_event_log(log.as_bytes()).unwrap();
    let mut engine = RaceEngine::new(config(1), MemorySink::new()).unwrap();
    let skipped = engine.process_events(&events);

    assert_eq!(skipped.len(), 1);
    assert!(matches!(skipped[0], EngineError::InvalidStartTime { competitor: 1, .. }));
    assert_eq!(engine.history().len(), 3);
    assert_eq!(engine.sink().lines().len(), 3);
    assert_eq!(engine.check_disqualifications().unwrap(), 0);
}

#[test]
fn structural_error_aborts_before_processing() {
    let log = "\
[09:05:59.867] 1 1
[09:15:00.841] 20 1
";
    assert!(matches!(
        parse_event_log(log.as_bytes()),
        Err(EngineError::AtLine { line: 2, .. })
    ));
}

fn assert_invariants(comp: &Competitor, laps: u32) {
    assert_eq!(comp.shots % 5, 0, "competitor({}) shots {}", comp.id, comp.shots);
    assert!(comp.lap_results.len() <= laps as usize);
    if comp.status != Status::OnFiringRange {
        assert!(comp.hits <= comp.shots, "competitor({}) {}/{}", comp.id, comp.hits, comp.shots);
    }
}

#[test]
fn invariants_hold_after_every_event() {
    let log = "\
[09:15:00.841] 2 1 09:30:00.000
[09:30:01.005] 4 1
[09:49:31.659] 5 1 1
[09:49:33.123] 6 1 1
[09:49:33.223] 6 1 2
[09:49:33.323] 6 1 3
[09:49:33.423] 6 1 4
[09:49:33.523] 6 1 5
[09:49:33.623] 6 1 5
[09:49:38.339] 7 1
[09:59:03.872] 10 1
[10:19:31.659] 5 1 1
[10:19:38.339] 7 1
[10:19:55.915] 8 1
[10:25:48.391] 9 1
[10:29:03.872] 10 1
[10:35:03.872] 10 1
";
    init_logging();
    let events = parse_event_log(log.as_bytes()).unwrap();
    let laps = 2;
    let mut engine = RaceEngine::new(config(laps), MemorySink::new()).unwrap();

    let mut rejected = 0;
    for event in &events {
        if engine.process_event(event).is_err() {
            rejected += 1;
        }
        for comp in engine.competitors() {
            assert_invariants(comp, laps);
        }
    }

    // The sixth hit and the third lap are rejected
    assert_eq!(rejected, 2);
    let comp = engine.competitor(1).unwrap();
    assert_eq!(comp.status, Status::Finished);
    assert_eq!((comp.hits, comp.shots), (5, 10));
    assert_eq!(
        engine.generate_report().to_string(),
        "[00:59:03.872] 1 [{00:29:03.872, 2.094}, {00:30:00.000, 2.167}] {00:05:52.476, 0.709} 5/10\n"
    );
}
