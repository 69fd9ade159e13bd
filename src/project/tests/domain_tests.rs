//! Domain tests for projects, memberships, roles and tags.

use crate::identity::domain::{Email, UserId};
use crate::project::domain::{
    InvitationStatus, MemberRole, Project, ProjectDomainError, ProjectId, ProjectMember, Tag,
    TagColor,
};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[case("", ProjectDomainError::EmptyProjectTitle)]
#[case("   ", ProjectDomainError::EmptyProjectTitle)]
fn project_rejects_blank_titles(#[case] title: &str, #[case] expected: ProjectDomainError) {
    let result = Project::new(title, None, UserId::new(), &DefaultClock);
    assert_eq!(result.err(), Some(expected));
}

#[rstest]
fn project_rejects_overlong_titles() {
    let title = "x".repeat(201);
    let result = Project::new(&title, None, UserId::new(), &DefaultClock);
    assert_eq!(
        result.err(),
        Some(ProjectDomainError::ProjectTitleTooLong { max: 200 })
    );
}

#[rstest]
fn project_trims_title_and_drops_blank_description() {
    let owner = UserId::new();
    let project = Project::new("  Launch  ", Some("  ".to_owned()), owner, &DefaultClock)
        .expect("valid project");

    assert_eq!(project.title(), "Launch");
    assert_eq!(project.description(), None);
    assert_eq!(project.owner_id(), owner);
    assert_eq!(project.created_at(), project.updated_at());
}

#[rstest]
#[case(MemberRole::Owner, MemberRole::Admin, true)]
#[case(MemberRole::Admin, MemberRole::Admin, true)]
#[case(MemberRole::Member, MemberRole::Admin, false)]
#[case(MemberRole::Viewer, MemberRole::Member, false)]
#[case(MemberRole::Viewer, MemberRole::Viewer, true)]
fn roles_are_ordered_by_privilege(
    #[case] held: MemberRole,
    #[case] required: MemberRole,
    #[case] permitted: bool,
) {
    assert_eq!(held.permits(required), permitted);
}

#[rstest]
#[case("owner", MemberRole::Owner)]
#[case(" Admin ", MemberRole::Admin)]
#[case("MEMBER", MemberRole::Member)]
#[case("viewer", MemberRole::Viewer)]
fn roles_parse_from_storage_labels(#[case] raw: &str, #[case] expected: MemberRole) {
    assert_eq!(MemberRole::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_role_labels_are_rejected() {
    assert!(MemberRole::try_from("guest").is_err());
}

#[rstest]
fn owner_role_cannot_be_invited() {
    let email = Email::new("someone@example.com").expect("valid email");
    let result = ProjectMember::invite(ProjectId::new(), email, MemberRole::Owner, &DefaultClock);
    assert_eq!(result.err(), Some(ProjectDomainError::OwnerRoleNotInvitable));
}

#[rstest]
fn invitation_binds_user_on_acceptance() {
    let email = Email::new("guest@example.com").expect("valid email");
    let mut member =
        ProjectMember::invite(ProjectId::new(), email, MemberRole::Member, &DefaultClock)
            .expect("valid invitation");
    assert_eq!(member.status(), InvitationStatus::Pending);
    assert_eq!(member.user_id(), None);

    let user = UserId::new();
    member.accept(user).expect("first acceptance succeeds");

    assert_eq!(member.status(), InvitationStatus::Accepted);
    assert_eq!(member.user_id(), Some(user));
    assert!(matches!(
        member.accept(UserId::new()),
        Err(ProjectDomainError::InvitationAlreadyAccepted(_))
    ));
}

#[rstest]
#[case("#A1B2C3", "#a1b2c3")]
#[case("  #00ff00 ", "#00ff00")]
fn tag_colors_are_normalised(#[case] raw: &str, #[case] expected: &str) {
    let color = TagColor::new(raw).expect("valid color");
    assert_eq!(color.as_str(), expected);
}

#[rstest]
#[case("red")]
#[case("#fff")]
#[case("#12345g")]
#[case("123456")]
fn malformed_tag_colors_are_rejected(#[case] raw: &str) {
    assert!(matches!(
        TagColor::new(raw),
        Err(ProjectDomainError::InvalidTagColor(_))
    ));
}

#[rstest]
fn tag_name_key_ignores_case() {
    let color = TagColor::new("#ff0000").expect("valid color");
    let tag = Tag::new(ProjectId::new(), " Urgent ", color, &DefaultClock).expect("valid tag");
    assert_eq!(tag.name, "Urgent");
    assert_eq!(tag.name_key(), "urgent");
}

#[rstest]
fn blank_tag_names_are_rejected() {
    let color = TagColor::new("#ff0000").expect("valid color");
    let result = Tag::new(ProjectId::new(), "  ", color, &DefaultClock);
    assert_eq!(result.err(), Some(ProjectDomainError::EmptyTagName));
}
