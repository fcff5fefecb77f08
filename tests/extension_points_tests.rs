use chart_compose::api::{
    BAR_PANEL_EXTENSION_PREFIX, BarChart, ChartConfig, ChartNode, InputData, PanelKind,
};
use chart_compose::core::ColumnMetadata;
use chart_compose::error::{ChartError, ChartResult};
use chart_compose::extensions::{
    AppliedExtension, ExtensionDescriptor, ExtensionOutcome, ExtensionPoints, Extensible,
    apply_extensions,
};
use indexmap::IndexMap;
use serde_json::{Value, json};

/// Minimal mark: `strokeStyle` goes through a setter, `id` is owned by the
/// mark and `top` is computed by the chart.
#[derive(Debug, Default)]
struct LineMark {
    stroke_style: Option<String>,
    setter_calls: usize,
    properties: IndexMap<String, Value>,
}

impl Extensible for LineMark {
    fn extension_descriptor(&self) -> ExtensionDescriptor {
        ExtensionDescriptor::new()
            .setter("strokeStyle")
            .locked("id")
            .intercepted("top")
    }

    fn call_setter(&mut self, member: &str, value: &Value) -> ChartResult<()> {
        match (member, value.as_str()) {
            ("strokeStyle", Some(color)) => {
                self.stroke_style = Some(color.to_owned());
                self.setter_calls += 1;
                Ok(())
            }
            _ => Err(ChartError::argument_invalid(member, "expected a color string")),
        }
    }

    fn set_property(&mut self, member: &str, value: Value) {
        self.properties.insert(member.to_owned(), value);
    }
}

fn points(entries: &[(&str, Value)]) -> ExtensionPoints {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_owned(), value.clone()))
        .collect()
}

#[test]
fn setters_are_called_and_other_members_assigned() {
    let mut mark = LineMark::default();
    let points = points(&[
        ("line_strokeStyle", json!("#336699")),
        ("line_lineWidth", json!(2)),
        ("dot_strokeStyle", json!("#000000")),
    ]);

    let applied = apply_extensions(Some(&mut mark), "line_", Some(&points)).expect("apply");

    assert_eq!(mark.stroke_style.as_deref(), Some("#336699"));
    assert_eq!(mark.setter_calls, 1);
    assert_eq!(mark.properties.get("lineWidth"), Some(&json!(2)));
    assert!(!mark.properties.contains_key("strokeStyle"));
    assert_eq!(
        applied,
        vec![
            AppliedExtension {
                member: "strokeStyle".to_owned(),
                outcome: ExtensionOutcome::Called,
            },
            AppliedExtension {
                member: "lineWidth".to_owned(),
                outcome: ExtensionOutcome::Assigned,
            },
        ]
    );
}

#[test]
fn locked_and_intercepted_members_are_skipped() {
    let mut mark = LineMark::default();
    let points = points(&[("line_id", json!("other")), ("line_top", json!(12))]);

    let applied = apply_extensions(Some(&mut mark), "line_", Some(&points)).expect("apply");

    assert!(mark.properties.is_empty());
    let outcomes: Vec<ExtensionOutcome> = applied.iter().map(|entry| entry.outcome).collect();
    assert_eq!(
        outcomes,
        [
            ExtensionOutcome::SkippedLocked,
            ExtensionOutcome::SkippedIntercepted
        ]
    );
}

#[test]
fn missing_target_or_points_is_a_no_op() {
    let points = points(&[("line_strokeStyle", json!("#336699"))]);
    let applied = apply_extensions::<LineMark>(None, "line_", Some(&points)).expect("no target");
    assert!(applied.is_empty());

    let mut mark = LineMark::default();
    let applied = apply_extensions(Some(&mut mark), "line_", None).expect("no points");
    assert!(applied.is_empty());
    assert_eq!(mark.setter_calls, 0);
}

#[test]
fn setter_errors_are_propagated() {
    let mut mark = LineMark::default();
    let points = points(&[("line_strokeStyle", json!(42))]);

    let err = apply_extensions(Some(&mut mark), "line_", Some(&points)).expect_err("bad value");
    assert!(matches!(err, ChartError::ArgumentInvalid { .. }));
}

#[test]
fn chart_panels_receive_their_prefixed_extensions() {
    let config = ChartConfig::new()
        .with_margins(0.0)
        .with_extension_point("base_canvas", "elsewhere")
        .with_extension_point("base_width", 500)
        .with_extension_point("base_fillStyle", "#eeeeee")
        .with_extension_point(format!("{BAR_PANEL_EXTENSION_PREFIX}strokeStyle"), "#111111");
    let mut chart = ChartNode::new(BarChart, config);
    chart
        .set_data(
            InputData::new(
                vec![
                    ColumnMetadata::new(0, "Region", "String"),
                    ColumnMetadata::new(1, "Sales", "Numeric"),
                ],
                vec![vec![json!("North"), json!(1)]],
            ),
            None,
        )
        .expect("set data");
    chart.pre_render().expect("pre-render");

    let base = chart.panels().base().expect("base panel");
    assert_eq!(base.bounds().width, 500.0);
    assert_eq!(base.property("fillStyle"), Some(&json!("#eeeeee")));
    assert_eq!(base.property("canvas"), None);

    let content = chart.panels().find("content").expect("bar panel");
    assert!(matches!(content.kind(), PanelKind::Content));
    assert_eq!(content.property("strokeStyle"), Some(&json!("#111111")));
}

#[test]
fn invalid_panel_setter_value_fails_the_pre_render() {
    let config = ChartConfig::new().with_extension_point("base_margins", "1 2 3 4 5");
    let mut chart = ChartNode::new(BarChart, config);
    chart
        .set_resultset(vec![vec![json!("North"), json!(1)]])
        .expect("rows");

    let err = chart.pre_render().expect_err("invalid margins override");
    assert!(matches!(err, ChartError::ArgumentInvalid { ref name, .. } if name == "margins"));
}
