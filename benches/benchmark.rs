use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pole_qc::engine::run_qc;
use pole_qc::model::{Attachment, AttachmentCategory, Measure, Midspan, Model, Pole, Span};
use pole_qc::rules::Rules;

/// Builds a synthetic job of `pole_count` poles strung together by
/// `pole_count - 1` spans and midspans, each carrying a handful of
/// attachments/measures across a spread of owners and heights. Shaped to
/// exercise every evaluator (classification, per-entity rules, and the
/// cross-pole ordering pass) rather than to resemble any real survey.
fn synthetic_job(pole_count: usize) -> Model {
  let mut model = Model::default();

  for i in 0..pole_count {
    let pole_id = format!("P{i}");
    let attachments = vec![
      Attachment {
        id: format!("{pole_id}-A1"),
        category: AttachmentCategory::Wire,
        owner: "Acme".into(),
        label: "Comm".into(),
        proposed_in: Some(200 + (i as i32 % 5) * 3),
        ..Attachment::default()
      },
      Attachment {
        id: format!("{pole_id}-A2"),
        category: AttachmentCategory::Wire,
        owner: "Other Co".into(),
        label: "Comm".into(),
        proposed_in: Some(190 + (i as i32 % 7) * 2),
        ..Attachment::default()
      },
      Attachment {
        id: format!("{pole_id}-A3"),
        category: AttachmentCategory::Wire,
        owner: "PowerCo".into(),
        label: "Neutral".into(),
        proposed_in: Some(260),
        ..Attachment::default()
      },
    ];
    model.poles.push(Pole {
      pole_id: pole_id.clone(),
      pole_tag: format!("TAG-{i}"),
      attachments,
      ..Pole::default()
    });

    if i > 0 {
      let prev = format!("P{}", i - 1);
      let connection_id = format!("C{i}");
      model.spans.push(Span {
        connection_id: connection_id.clone(),
        a_node_id: prev,
        b_node_id: pole_id,
        a_is_pole: true,
        b_is_pole: true,
        ..Span::default()
      });
      model.midspans.push(Midspan {
        midspan_id: format!("M{i}"),
        connection_id,
        row_type_raw: "Default".into(),
        measures: vec![
          Measure {
            owner: "Acme".into(),
            label: "Comm".into(),
            proposed_in: Some(195 + (i as i32 % 4) * 2),
            ..Measure::default()
          },
          Measure {
            owner: "PowerCo".into(),
            label: "Secondary".into(),
            proposed_in: Some(250),
            ..Measure::default()
          },
        ],
        ..Midspan::default()
      });
    }
  }

  model
}

fn run_qc_benchmark(c: &mut Criterion) {
  let model = synthetic_job(300);
  let mut group = c.benchmark_group("run_qc");
  group.throughput(criterion::Throughput::Elements(
    (model.poles.len() + model.midspans.len()) as u64,
  ));

  // A changed tunable on every iteration mirrors how the engine is used in
  // practice (§1, §9): cheap enough to re-run on every edit to `Rules`.
  group.bench_function("default_rules", |b| {
    b.iter(|| black_box(run_qc(black_box(&model), &Rules::default())));
  });

  group.bench_function("tightened_rules", |b| {
    let mut rules = Rules::default();
    rules.pole.min_lowest_comm_attach_in += 24;
    rules.midspan.comm_sep_in += 2;
    b.iter(|| black_box(run_qc(black_box(&model), black_box(&rules))));
  });

  group.finish();
}

criterion_group!(benches, run_qc_benchmark);
criterion_main!(benches);
