//! Thread-safe in-memory project repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::identity::domain::{Email, UserId};
use crate::project::{
    domain::{MemberId, Project, ProjectId, ProjectMember, Tag, TagId},
    ports::{ProjectEntityRef, ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};

/// Write operations that can be made to fail for compensation tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectOperation {
    /// [`ProjectRepository::store_member`].
    StoreMember,
    /// [`ProjectRepository::delete_project`].
    DeleteProject,
}

/// Thread-safe in-memory project repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<InMemoryProjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: HashMap<ProjectId, Project>,
    members: HashMap<MemberId, ProjectMember>,
    tags: HashMap<TagId, Tag>,
    failing: HashSet<ProjectOperation>,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `operation` fail with a transient error.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::Transient`] when the state lock is
    /// poisoned.
    pub fn fail_next(&self, operation: ProjectOperation) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.failing.insert(operation);
        Ok(())
    }

    /// Returns the number of stored projects.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::Transient`] when the state lock is
    /// poisoned.
    pub fn project_count(&self) -> ProjectRepositoryResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.projects.len())
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> ProjectRepositoryError {
    ProjectRepositoryError::transient(std::io::Error::other(err.to_string()))
}

fn take_fault(
    state: &mut InMemoryProjectState,
    operation: ProjectOperation,
) -> ProjectRepositoryResult<()> {
    if state.failing.remove(&operation) {
        return Err(ProjectRepositoryError::transient(std::io::Error::other(
            format!("injected failure for {operation:?}"),
        )));
    }
    Ok(())
}

fn is_accepted_member(member: &ProjectMember, user_id: UserId) -> bool {
    member.invitation_accepted() && member.user_id() == Some(user_id)
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store_project(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.projects.contains_key(&project.id()) {
            return Err(ProjectRepositoryError::Conflict(format!(
                "duplicate project identifier: {}",
                project.id()
            )));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn list_projects_for_user(
        &self,
        user_id: UserId,
    ) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self.state.read().map_err(poisoned)?;
        let project_ids: HashSet<ProjectId> = state
            .members
            .values()
            .filter(|member| is_accepted_member(member, user_id))
            .map(ProjectMember::project_id)
            .collect();
        let mut projects: Vec<Project> = project_ids
            .iter()
            .filter_map(|id| state.projects.get(id).cloned())
            .collect();
        projects.sort_by_key(Project::created_at);
        Ok(projects)
    }

    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        take_fault(&mut state, ProjectOperation::DeleteProject)?;
        if state.projects.remove(&id).is_none() {
            return Err(ProjectRepositoryError::NotFound(ProjectEntityRef::Project(
                id,
            )));
        }
        state.members.retain(|_, member| member.project_id() != id);
        state.tags.retain(|_, tag| tag.project_id != id);
        Ok(())
    }

    async fn store_member(&self, member: &ProjectMember) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        take_fault(&mut state, ProjectOperation::StoreMember)?;
        if !state.projects.contains_key(&member.project_id()) {
            return Err(ProjectRepositoryError::NotFound(ProjectEntityRef::Project(
                member.project_id(),
            )));
        }
        let duplicate_email = state.members.values().any(|existing| {
            existing.project_id() == member.project_id() && existing.email() == member.email()
        });
        if duplicate_email || state.members.contains_key(&member.id()) {
            return Err(ProjectRepositoryError::Conflict(format!(
                "{} is already a member of project {}",
                member.email(),
                member.project_id()
            )));
        }
        state.members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn update_member(&self, member: &ProjectMember) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let slot = state
            .members
            .get_mut(&member.id())
            .ok_or(ProjectRepositoryError::NotFound(ProjectEntityRef::Member(
                member.id(),
            )))?;
        *slot = member.clone();
        Ok(())
    }

    async fn find_member_by_user(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> ProjectRepositoryResult<Option<ProjectMember>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .members
            .values()
            .find(|member| member.project_id() == project_id && is_accepted_member(member, user_id))
            .cloned())
    }

    async fn find_member_by_email(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ProjectRepositoryResult<Option<ProjectMember>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .members
            .values()
            .find(|member| member.project_id() == project_id && member.email() == email)
            .cloned())
    }

    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectMember>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut members: Vec<ProjectMember> = state
            .members
            .values()
            .filter(|member| member.project_id() == project_id)
            .cloned()
            .collect();
        members.sort_by_key(ProjectMember::invited_at);
        Ok(members)
    }

    async fn delete_member(&self, id: MemberId) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .members
            .remove(&id)
            .map(|_| ())
            .ok_or(ProjectRepositoryError::NotFound(ProjectEntityRef::Member(id)))
    }

    async fn store_tag(&self, tag: &Tag) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.projects.contains_key(&tag.project_id) {
            return Err(ProjectRepositoryError::NotFound(ProjectEntityRef::Project(
                tag.project_id,
            )));
        }
        let key = tag.name_key();
        let duplicate = state
            .tags
            .values()
            .any(|existing| existing.project_id == tag.project_id && existing.name_key() == key);
        if duplicate {
            return Err(ProjectRepositoryError::Conflict(format!(
                "tag '{}' already exists in project {}",
                tag.name, tag.project_id
            )));
        }
        state.tags.insert(tag.id, tag.clone());
        Ok(())
    }

    async fn find_tag(&self, id: TagId) -> ProjectRepositoryResult<Option<Tag>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tags.get(&id).cloned())
    }

    async fn list_tags(&self, project_id: ProjectId) -> ProjectRepositoryResult<Vec<Tag>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|tag| tag.project_id == project_id)
            .cloned()
            .collect();
        tags.sort_by_key(Tag::name_key);
        Ok(tags)
    }

    async fn delete_tag(&self, id: TagId) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .tags
            .remove(&id)
            .map(|_| ())
            .ok_or(ProjectRepositoryError::NotFound(ProjectEntityRef::Tag(id)))
    }
}
