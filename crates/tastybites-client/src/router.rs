//! Which screen is showing, and how screens are reached.
//!
//! All view changes go through [`Router::navigate`]. Views that need a chef
//! or recipe carry it, so a details screen can never exist without its
//! subject.

use std::fmt;

use thiserror::Error;

use tastybites_shared::{Chef, Recipe, Role, Session};

/// Bottom tab bar entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Home,
    Recipes,
    Chefs,
    Notifications,
    Menu,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Home,
    RecipeList,
    ChefList,
    ChefProfile(Chef),
    RecipeDetails(Recipe),
    Notifications,
    Menu,
    BuyForm(Recipe),
    Profile,
    ChangePassword,
}

/// [`View`] without its payload, for errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Home,
    RecipeList,
    ChefList,
    ChefProfile,
    RecipeDetails,
    Notifications,
    Menu,
    BuyForm,
    Profile,
    ChangePassword,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl View {
    pub fn kind(&self) -> ViewKind {
        match self {
            View::Home => ViewKind::Home,
            View::RecipeList => ViewKind::RecipeList,
            View::ChefList => ViewKind::ChefList,
            View::ChefProfile(_) => ViewKind::ChefProfile,
            View::RecipeDetails(_) => ViewKind::RecipeDetails,
            View::Notifications => ViewKind::Notifications,
            View::Menu => ViewKind::Menu,
            View::BuyForm(_) => ViewKind::BuyForm,
            View::Profile => ViewKind::Profile,
            View::ChangePassword => ViewKind::ChangePassword,
        }
    }

    /// Whether this view shows a search box.
    pub fn searchable(&self) -> bool {
        matches!(self, View::Home | View::RecipeList | View::ChefList)
    }

    /// The tab highlighted while this view is showing.
    pub fn tab(&self) -> Tab {
        match self {
            View::Home | View::RecipeDetails(_) | View::BuyForm(_) => Tab::Home,
            View::RecipeList => Tab::Recipes,
            View::ChefList | View::ChefProfile(_) => Tab::Chefs,
            View::Notifications => Tab::Notifications,
            View::Menu | View::Profile | View::ChangePassword => Tab::Menu,
        }
    }
}

impl From<Tab> for View {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Home => View::Home,
            Tab::Recipes => View::RecipeList,
            Tab::Chefs => View::ChefList,
            Tab::Notifications => View::Notifications,
            Tab::Menu => View::Menu,
        }
    }
}

/// A user action that may change the view.
#[derive(Debug, Clone)]
pub enum Navigation {
    Tab(Tab),
    OpenChef(Chef),
    OpenRecipe(Recipe),
    BuyRecipe,
    OpenProfile,
    OpenChangePassword,
    Back,
}

impl Navigation {
    fn name(&self) -> &'static str {
        match self {
            Navigation::Tab(_) => "tab",
            Navigation::OpenChef(_) => "open-chef",
            Navigation::OpenRecipe(_) => "open-recipe",
            Navigation::BuyRecipe => "buy-recipe",
            Navigation::OpenProfile => "open-profile",
            Navigation::OpenChangePassword => "open-change-password",
            Navigation::Back => "back",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("{action} is not available from {from}")]
    Unreachable { from: ViewKind, action: &'static str },

    #[error("{0} has no search box")]
    NotSearchable(ViewKind),
}

#[derive(Debug, Clone)]
pub struct Router {
    view: View,
    search: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            view: View::Home,
            search: String::new(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Apply `nav`. On error the view is unchanged.
    pub fn navigate(&mut self, nav: Navigation) -> Result<&View, RouterError> {
        let from = self.view.kind();
        let action = nav.name();
        let next = match (nav, &self.view) {
            (Navigation::Tab(tab), _) => View::from(tab),
            (Navigation::OpenChef(chef), View::ChefList) => View::ChefProfile(chef),
            (Navigation::OpenRecipe(recipe), View::Home | View::RecipeList | View::ChefProfile(_)) => {
                View::RecipeDetails(recipe)
            }
            (Navigation::BuyRecipe, View::RecipeDetails(recipe)) => View::BuyForm(recipe.clone()),
            (Navigation::OpenProfile, View::Menu) => View::Profile,
            (Navigation::OpenChangePassword, View::Menu) => View::ChangePassword,
            (Navigation::Back, View::RecipeDetails(_)) => View::Home,
            (Navigation::Back, View::BuyForm(recipe)) => View::RecipeDetails(recipe.clone()),
            _ => return Err(RouterError::Unreachable { from, action }),
        };

        tracing::debug!(%from, to = %next.kind(), action, "navigate");
        self.view = next;
        self.search.clear();
        Ok(&self.view)
    }

    pub fn set_search(&mut self, query: impl Into<String>) -> Result<(), RouterError> {
        if !self.view.searchable() {
            return Err(RouterError::NotSearchable(self.view.kind()));
        }
        self.search = query.into();
        Ok(())
    }
}

/// Screens of the logged-out flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Register,
}

impl AuthScreen {
    /// The "no account? / already registered?" link.
    pub fn switch(self) -> Self {
        match self {
            AuthScreen::Login => AuthScreen::Register,
            AuthScreen::Register => AuthScreen::Login,
        }
    }
}

/// Where the app opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Auth(AuthScreen),
    Dashboard(Role),
}

impl Launch {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Launch::Dashboard(session.role),
            None => Launch::Auth(AuthScreen::Login),
        }
    }
}
