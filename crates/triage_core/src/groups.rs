use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::{
    domain::{ArticleId, ArticleStatus, ClusterId, NON_ADDABLE_GROUPS, RESERVED_GROUPS},
    protocol::{Article, Cluster},
};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub articles: Vec<Arc<Article>>,
}

impl Group {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            articles: Vec::new(),
        }
    }

    fn position(&self, article_id: &ArticleId) -> Option<usize> {
        self.articles
            .iter()
            .position(|article| &article.id == article_id)
    }
}

/// Reserved groups first, then custom groups in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Groups {
    groups: Vec<Group>,
}

impl Groups {
    pub fn partition(cluster: &Cluster) -> Self {
        let mut groups = Self {
            groups: RESERVED_GROUPS.iter().map(|name| Group::empty(name)).collect(),
        };
        for article in &cluster.articles {
            let target = article.status.initial_group();
            groups
                .group_mut_or_insert(target)
                .articles
                .push(Arc::new(article.clone()));
        }
        groups
    }

    pub fn get(&self, name: &str) -> Option<&[Arc<Article>]> {
        self.groups
            .iter()
            .find(|group| group.name == name)
            .map(|group| group.articles.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.groups.iter().map(|group| group.name.clone()).collect()
    }

    pub fn addable_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|group| !NON_ADDABLE_GROUPS.contains(&group.name.as_str()))
            .map(|group| group.name.clone())
            .collect()
    }

    pub fn group_of(&self, article_id: &ArticleId) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.position(article_id).is_some())
            .map(|group| group.name.as_str())
    }

    pub fn article_count(&self) -> usize {
        self.groups.iter().map(|group| group.articles.len()).sum()
    }

    fn group_mut_or_insert(&mut self, name: &str) -> &mut Group {
        let index = match self.groups.iter().position(|group| group.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(Group::empty(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    // The target group is skipped; the first other holder wins.
    fn reassigned(&self, article_id: &ArticleId, target: &str) -> Option<Groups> {
        let (source, position) = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.name != target)
            .find_map(|(index, group)| group.position(article_id).map(|pos| (index, pos)))?;

        let mut next = self.clone();
        let article = next.groups[source].articles.remove(position);
        next.group_mut_or_insert(target).articles.push(article);
        Some(next)
    }
}

pub struct GroupManager {
    cluster_id: ClusterId,
    grouping: watch::Sender<Arc<Groups>>,
    addable: watch::Sender<Vec<String>>,
    article_groups: Mutex<HashMap<ArticleId, watch::Sender<String>>>,
}

impl GroupManager {
    pub fn new(cluster: &Cluster) -> Self {
        let groups = Groups::partition(cluster);
        debug!(
            cluster_id = %cluster.id,
            articles = groups.article_count(),
            groups = groups.groups.len(),
            "partitioned cluster into review groups"
        );
        let (addable, _) = watch::channel(groups.addable_names());
        let (grouping, _) = watch::channel(Arc::new(groups));
        Self {
            cluster_id: cluster.id.clone(),
            grouping,
            addable,
            article_groups: Mutex::new(HashMap::new()),
        }
    }

    pub fn cluster_id(&self) -> &ClusterId {
        &self.cluster_id
    }

    fn article_groups(&self) -> MutexGuard<'_, HashMap<ArticleId, watch::Sender<String>>> {
        self.article_groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn observe_grouping(&self) -> watch::Receiver<Arc<Groups>> {
        self.grouping.subscribe()
    }

    pub fn grouping(&self) -> Arc<Groups> {
        self.grouping.borrow().clone()
    }

    pub fn observe_addable_group_names(&self) -> watch::Receiver<Vec<String>> {
        self.addable.subscribe()
    }

    /// Returns whether the grouping changed.
    pub fn assign_article(&self, article_id: &ArticleId, target: &str) -> bool {
        if target.is_empty() {
            return false;
        }

        // Held for the whole update so observers see assignments in call order.
        let mut watchers = self.article_groups();
        let current = self.grouping();
        let Some(next) = current.reassigned(article_id, target) else {
            return false;
        };
        debug!(
            cluster_id = %self.cluster_id,
            article_id = %article_id,
            from = current.group_of(article_id).unwrap_or_default(),
            to = target,
            "reassigned article"
        );

        let addable = next.addable_names();
        let next = Arc::new(next);
        self.grouping.send_replace(Arc::clone(&next));
        self.addable.send_if_modified(|names| {
            if *names == addable {
                return false;
            }
            *names = addable;
            true
        });

        watchers.retain(|_, sender| sender.receiver_count() > 0);
        for (id, sender) in watchers.iter() {
            let name = group_name_in(&next, id);
            sender.send_if_modified(|current| {
                if *current == name {
                    return false;
                }
                *current = name;
                true
            });
        }
        true
    }

    /// Name of the group holding the article, or the default status (`""`) if no group does.
    pub fn find_article_group_name(&self, article_id: &ArticleId) -> String {
        group_name_in(&self.grouping.borrow(), article_id)
    }

    pub fn observe_article_group_name(&self, article_id: &ArticleId) -> watch::Receiver<String> {
        let mut watchers = self.article_groups();
        if let Some(sender) = watchers.get(article_id) {
            return sender.subscribe();
        }
        let (sender, receiver) = watch::channel(self.find_article_group_name(article_id));
        watchers.insert(article_id.clone(), sender);
        receiver
    }
}

fn group_name_in(groups: &Groups, article_id: &ArticleId) -> String {
    groups
        .group_of(article_id)
        .map(str::to_string)
        .unwrap_or_else(|| ArticleStatus::Default.into())
}

#[cfg(test)]
#[path = "tests/groups_tests.rs"]
mod tests;
