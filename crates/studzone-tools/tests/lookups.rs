//! Lookup operations end to end against a mock portal

use chrono::{NaiveDate, NaiveTime};
use studzone_core::{ClientConfig, Credentials, Day, PortalConfig, PortalError, SubjectMarks};
use studzone_tools::{CaExam, SessionManager, ToolError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_FORM: &str = r#"<html><body><form method="post">
  <input name="__RequestVerificationToken" type="hidden" value="tok-7" />
  <input name="rollno" /><input name="password" type="password" />
</form></body></html>"#;

const COURSES: &str = r#"<html><body>
  <div class="card"><h5>20XT81</h5><p>Operating Systems</p></div>
  <div class="card"><h5>20XT82</h5><p>Computer Networks</p></div>
  <div class="card"><h5>19PD01</h5><p>Professional Development</p></div>
</body></html>"#;

const ATTENDANCE: &str = r#"<html><body><table id="example"><tbody>
  <tr><td>20XT81</td><td>40</td><td>0</td><td>8</td><td>32</td><td>80</td><td>0</td><td>0</td><td>a</td><td>b</td></tr>
  <tr><td>20XT82</td><td>40</td><td>0</td><td>12</td><td>28</td><td>70</td><td>0</td><td>0</td><td>a</td><td>b</td></tr>
</tbody></table></body></html>"#;

const MARKS: &str = r#"<html><body>
<table class="table">
  <tr><th colspan="6">Lab</th></tr>
  <tr><th>Code</th><th>Name</th><th>LT1</th><th>LT2</th><th>Total</th><th>Conv</th></tr>
  <tr><td>20XT87</td><td>Networks Lab</td><td>22</td><td>*</td><td></td><td></td></tr>
</table>
<table class="table">
  <tr><th colspan="12">Theory</th></tr>
  <tr><th>Code</th><th>Name</th><th>T1</th><th>T2</th><th>RT</th><th>RT1</th><th>RT2</th><th>Test</th><th>AP</th><th>Tut</th><th>Total</th><th>Conv</th></tr>
  <tr><td>20XT81</td><td>Operating Systems</td><td>25</td><td>27</td><td>*</td><td>*</td><td>*</td><td>52</td><td>7</td><td>11</td><td>70</td><td>35</td></tr>
</table>
</body></html>"#;

const TIMETABLE: &str = r#"<html><body><table class="table timetable-table"><tbody>
  <tr><th>MON</th>
    <td><div class="tooltip-wrapper"><b>20XT81</b><span class="tooltip-text">Operating Systems</span></div></td>
    <td>-</td>
    <td colspan="2"><div class="tooltip-wrapper"><b>20XT87</b><span class="tooltip-text">Networks Lab</span></div></td>
  </tr>
  <tr><th>TUE</th>
    <td colspan="4">-</td>
    <td><div class="tooltip-wrapper"><b>20XT82</b><span class="tooltip-text">Computer Networks</span></div></td>
  </tr>
</tbody></table></body></html>"#;

async fn portal() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/studzone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FORM))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/studzone"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/studzone/Home/Menu"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/studzone/Home/Menu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Main Menu"))
        .mount(&server)
        .await;

    for (page, body) in [
        ("/studzone/Attendance/courseplan", COURSES),
        ("/studzone/Attendance/StudentPercentage", ATTENDANCE),
        ("/studzone/ContinuousAssessment/CAMarksView", MARKS),
        ("/studzone/Attendance/TimeTable", TIMETABLE),
    ] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }

    server
}

fn manager(server: &MockServer) -> SessionManager {
    let config = PortalConfig::with_client(
        Credentials::new("22z201", "secret"),
        ClientConfig::with_base_url(format!("{}/studzone", server.uri())),
    );
    SessionManager::new(config).unwrap()
}

#[tokio::test]
async fn test_course_lookups() {
    let server = portal().await;
    let manager = manager(&server);

    assert_eq!(manager.all_courses().await.unwrap().len(), 3);
    assert_eq!(manager.search_courses("network").await.unwrap().len(), 1);
    assert_eq!(manager.course_details("20xt81").await.unwrap().name, "Operating Systems");
    assert_eq!(manager.courses_by_department("19").await.unwrap().len(), 1);

    let stats = manager.course_statistics().await.unwrap();
    assert_eq!(stats.unique_departments, 2);

    match manager.course_details("99ZZ99").await {
        Err(ToolError::NotFound { available, .. }) => assert_eq!(available.len(), 3),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(matches!(
        manager.search_courses("  ").await,
        Err(ToolError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_attendance_bunks() {
    let server = portal().await;
    let manager = manager(&server);

    let report = manager.subject_bunks("20XT81", 75.0).await.unwrap();
    assert_eq!(report.available_bunks, 2);

    let strict = manager.subject_bunks("20XT81", 80.0).await.unwrap();
    assert_eq!(strict.available_bunks, 0);

    let all = manager.all_bunks(75.0).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].available_bunks, 0);

    let summary = manager.attendance_summary().await.unwrap();
    assert_eq!(summary.total_hours, 80);
    assert_eq!(summary.overall_percentage, 75.0);

    assert!(matches!(
        manager.all_bunks(0.0).await,
        Err(ToolError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_marks_lookups() {
    let server = portal().await;
    let manager = manager(&server);

    let lab = manager.ca_mark("networks", CaExam::First).await.unwrap();
    assert_eq!(lab.subject_code, "20XT87");
    assert_eq!(lab.mark, Some(22.0));

    let t2 = manager.ca_mark("20XT81", CaExam::Second).await.unwrap();
    assert_eq!(t2.mark, Some(27.0));

    let second = manager.all_ca_marks(CaExam::Second).await.unwrap();
    assert_eq!(second.len(), 1);

    let assignments = manager.assignment_marks().await.unwrap();
    assert_eq!(assignments[0].mark, Some(7.0));
    let tutorials = manager.tutorial_marks().await.unwrap();
    assert_eq!(tutorials[0].mark, Some(11.0));

    assert!(matches!(
        manager.subject_marks("operating systems").await.unwrap(),
        SubjectMarks::Theory(_)
    ));
    assert_eq!(manager.list_subjects().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_timetable_lookups() {
    let server = portal().await;
    let manager = manager(&server);

    let monday = manager.schedule_for_day("monday").await.unwrap();
    assert_eq!(monday.total_classes(), 2);
    assert_eq!(monday.last_class.as_deref(), Some("10:30 - 12:10"));

    // 2024-01-01 is a Monday; after the lab the next class is Tuesday period 5.
    let now = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(12, 30, 0).unwrap());
    let report = manager.next_class(now).await.unwrap();
    let next = report.next.unwrap();
    assert_eq!(next.entry.day, Day::Tuesday);
    assert_eq!(next.entry.period, 5);
    assert_eq!(next.days_ahead, 1);
    assert_eq!(report.break_minutes_remaining, Some(70));

    let tomorrow = manager.tomorrows_schedule(now).await.unwrap();
    assert_eq!(tomorrow.subjects, vec!["20XT82"]);
    assert!(manager.schedule_from_now(now).await.unwrap().classes.is_empty());

    let week = manager.weekly_schedule().await.unwrap();
    assert_eq!(week.busiest_day, Some(Day::Monday));

    assert!(matches!(
        manager.schedule_for_day("someday").await,
        Err(ToolError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_error_closes_all_sessions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studzone"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let manager = manager(&server);
    let result = manager.all_attendance().await;

    assert!(matches!(result, Err(ToolError::Portal(PortalError::TokenNotFound))));
    assert_eq!(manager.active_scrapers().await, 0);
}
