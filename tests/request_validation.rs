//! Validation rules for building a cluster request.

use std::time::Duration;

use aurora_provision::{ClusterRequest, ClusterRequestBuilder, RequestError};
use rstest::{fixture, rstest};

#[fixture]
fn complete() -> ClusterRequestBuilder {
    ClusterRequest::builder()
        .region(" eu-west-1 ")
        .profile(Some(String::from("staging")))
        .cluster_id("orders")
        .engine("aurora-postgresql")
        .engine_version("15.4")
        .master_username("admin")
        .master_user_password("correct-horse")
        .security_group_ids(["sg-ops", " sg-app", "sg-ops"])
        .subnet_ids(["subnet-c", "subnet-a"])
        .subnet_group_name("orders-subnets")
        .subnet_group_description("orders database subnets")
        .instance_id("orders-1")
        .instance_class("db.r6g.large")
}

#[rstest]
fn complete_request_is_trimmed_and_normalised(complete: ClusterRequestBuilder) {
    let request = complete
        .build()
        .unwrap_or_else(|err| panic!("request should build: {err}"));

    assert_eq!(request.region(), "eu-west-1");
    assert_eq!(request.profile(), Some("staging"));
    assert_eq!(
        request.security_group_ids().iter().collect::<Vec<_>>(),
        vec!["sg-app", "sg-ops"]
    );
    assert_eq!(request.subnet_ids(), ["subnet-c", "subnet-a"]);
    assert_eq!(request.ready_timeout(), Duration::from_secs(60));
}

#[rstest]
#[case::region(|b: ClusterRequestBuilder| b.region(" "), "region")]
#[case::engine(|b: ClusterRequestBuilder| b.engine(""), "engine")]
#[case::engine_version(|b: ClusterRequestBuilder| b.engine_version("\t"), "engine_version")]
#[case::password(|b: ClusterRequestBuilder| b.master_user_password("  "), "master_user_password")]
#[case::description(
    |b: ClusterRequestBuilder| b.subnet_group_description(""),
    "subnet_group_description"
)]
#[case::security_groups(
    |b: ClusterRequestBuilder| b.security_group_ids([" ", ""]),
    "security_group_ids"
)]
#[case::subnets(|b: ClusterRequestBuilder| b.subnet_ids(Vec::<String>::new()), "subnet_ids")]
#[case::instance_class(|b: ClusterRequestBuilder| b.instance_class(" "), "instance_class")]
fn blank_fields_are_named(
    complete: ClusterRequestBuilder,
    #[case] blank: fn(ClusterRequestBuilder) -> ClusterRequestBuilder,
    #[case] field: &str,
) {
    let err = blank(complete).build().expect_err("blank field should fail");
    assert_eq!(err, RequestError::MissingField(field.to_owned()));
}

#[rstest]
fn password_never_appears_in_debug_output(complete: ClusterRequestBuilder) {
    let request = complete
        .build()
        .unwrap_or_else(|err| panic!("request should build: {err}"));
    let rendered = format!("{request:?} {:?}", request.cluster_spec("orders-subnets"));
    assert!(!rendered.contains("correct-horse"), "leaked: {rendered}");
}

#[rstest]
fn specs_carry_request_values(complete: ClusterRequestBuilder) {
    let request = complete
        .ready_timeout_minutes(15)
        .build()
        .unwrap_or_else(|err| panic!("request should build: {err}"));

    let group = request.subnet_group_spec();
    assert_eq!(group.name, "orders-subnets");
    assert_eq!(group.subnet_ids, vec!["subnet-c", "subnet-a"]);

    let cluster = request.cluster_spec(&group.name);
    assert_eq!(cluster.subnet_group_name, "orders-subnets");
    assert_eq!(cluster.master_user_password.expose(), "correct-horse");
    assert_eq!(request.ready_timeout(), Duration::from_secs(900));
}
