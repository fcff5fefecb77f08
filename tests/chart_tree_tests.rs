use std::rc::Rc;

use chart_compose::api::{BarChart, BasicChart, ChartConfig, ChartNode, ChartVariant};
use chart_compose::core::DataSet;
use chart_compose::error::ChartError;

#[test]
fn root_chart_is_its_own_root_and_owner() {
    let chart = ChartNode::new(BasicChart, ChartConfig::new());

    assert!(chart.is_root());
    assert_eq!(chart.parent(), None);
    assert_eq!(chart.root(), chart.id());
    assert_eq!(chart.owner(), chart.id());
    assert_eq!(chart.placement(), None);
    assert_eq!(chart.render_version(), 0);
    assert!(!chart.is_pre_rendered());
    assert_eq!(chart.variant_name(), "basic");
}

#[test]
fn chart_ids_are_unique() {
    let first = ChartNode::new(BasicChart, ChartConfig::new());
    let second = ChartNode::new(BasicChart, ChartConfig::new());
    assert_ne!(first.id(), second.id());
    assert_eq!(first.id().to_string(), format!("chart#{}", first.id().get()));
}

#[test]
fn child_requires_a_data_engine() {
    let root = ChartNode::new(BarChart, ChartConfig::new());
    let err = ChartNode::with_parent(&root, ChartConfig::new(), None).expect_err("no data");
    assert_eq!(err, ChartError::argument_required("dataEngine"));
}

#[test]
fn child_inherits_parent_options_and_identity() {
    let root = ChartNode::new(
        BarChart,
        ChartConfig::new()
            .with_size(800.0, 600.0)
            .with_title("Parent")
            .with_legend(true),
    );
    let config = ChartConfig {
        left: Some(10.0),
        top: Some(20.0),
        ..ChartConfig::new().with_title("Child")
    };
    let child = ChartNode::with_parent(&root, config, Some(DataSet::default())).expect("child");

    assert_eq!(child.parent(), Some(root.id()));
    assert_eq!(child.root(), root.id());
    assert_eq!(child.owner(), root.id());
    assert_eq!(child.variant_name(), "bar");
    assert!(Rc::ptr_eq(child.role_specs(), root.role_specs()));
    assert_eq!(child.placement(), Some((10.0, 20.0)));

    let options = child.options();
    assert_eq!((options.width, options.height), (800.0, 600.0));
    assert_eq!(options.title.as_deref(), Some("Child"));
    assert!(options.legend);
    assert_eq!(root.options().title.as_deref(), Some("Parent"));
}

#[test]
fn configure_applies_at_the_next_pre_render() {
    let mut chart = ChartNode::new(BasicChart, ChartConfig::new().with_margins("4"));
    chart.configure(&ChartConfig::new().with_title("Later"));

    assert_eq!(chart.options().title.as_deref(), Some("Later"));
    assert!(chart.options().margins.is_some());
}

#[test]
fn variants_declare_their_defaults() {
    assert!(!BasicChart.allow_no_data());
    assert_eq!(BarChart.default_options().width, 400.0);
    assert!(BarChart.default_options().animate);
}
