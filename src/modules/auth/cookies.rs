//! Session cookies built from the configured [`CookieConfig`] policy.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use classaccess_auth::IssuedToken;
use classaccess_config::{CookieConfig, SameSitePolicy};
use classaccess_core::AppError;
use classaccess_models::auth::UserData;
use time::Duration;

use crate::middleware::auth::ACCESS_COOKIE;

pub const REFRESH_COOKIE: &str = "refreshToken";
pub const USER_DATA_COOKIE: &str = "userData";

fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::None => SameSite::None,
        SameSitePolicy::Lax => SameSite::Lax,
        SameSitePolicy::Strict => SameSite::Strict,
    }
}

fn session_cookie(
    config: &CookieConfig,
    name: &'static str,
    value: String,
    max_age_secs: i64,
    http_only: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .secure(config.secure)
        .same_site(same_site(config.same_site))
        .max_age(Duration::seconds(max_age_secs))
        .build();

    if let Some(domain) = &config.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

pub fn with_access(jar: CookieJar, config: &CookieConfig, access: &IssuedToken) -> CookieJar {
    jar.add(session_cookie(
        config,
        ACCESS_COOKIE,
        access.token.clone(),
        access.max_age_secs(),
        true,
    ))
}

/// Adds access, refresh and (if enabled) the readable `userData` cookie.
pub fn with_session(
    jar: CookieJar,
    config: &CookieConfig,
    access: &IssuedToken,
    refresh: &IssuedToken,
    user: &UserData,
) -> Result<CookieJar, AppError> {
    let mut jar = with_access(jar, config, access).add(session_cookie(
        config,
        REFRESH_COOKIE,
        refresh.token.clone(),
        refresh.max_age_secs(),
        true,
    ));

    if config.user_data {
        let profile = serde_json::to_string(user)?;
        jar = jar.add(session_cookie(
            config,
            USER_DATA_COOKIE,
            profile,
            access.max_age_secs(),
            false,
        ));
    }

    Ok(jar)
}

/// Expires every session cookie the client sent.
pub fn clear_session(mut jar: CookieJar, config: &CookieConfig) -> CookieJar {
    for name in [ACCESS_COOKIE, REFRESH_COOKIE, USER_DATA_COOKIE] {
        let mut removal = Cookie::from(name);
        removal.set_path("/");
        if let Some(domain) = &config.domain {
            removal.set_domain(domain.clone());
        }
        jar = jar.remove(removal);
    }
    jar
}

/// Non-empty value of the `refreshToken` cookie.
pub fn refresh_cookie(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn token(value: &str, secs: i64) -> IssuedToken {
        IssuedToken {
            token: value.to_string(),
            expires_at: Utc::now() + TimeDelta::seconds(secs),
        }
    }

    #[test]
    fn access_cookie_follows_policy() {
        let config = CookieConfig {
            domain: Some("escuela.mx".into()),
            same_site: SameSitePolicy::Lax,
            ..CookieConfig::default()
        };
        let jar = with_access(CookieJar::new(), &config, &token("abc", 3600));
        let cookie = jar.get(ACCESS_COOKIE).unwrap();

        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.domain(), Some("escuela.mx"));
        assert_eq!(cookie.path(), Some("/"));
        let max_age = cookie.max_age().unwrap().whole_seconds();
        assert!((3590..=3600).contains(&max_age));
    }

    #[test]
    fn user_data_cookie_is_optional_and_readable() {
        let user = UserData {
            id_usu: 1,
            nombre_usu: "Ana".into(),
            ap_usu: "Ruiz".into(),
            am_usu: String::new(),
            correo_usu: "ana@escuela.mx".into(),
            priv_usu: classaccess_core::Role::Student,
            estatus_usu: true,
        };
        let access = token("a", 60);
        let refresh = token("r", 600);

        let jar = with_session(CookieJar::new(), &CookieConfig::default(), &access, &refresh, &user)
            .unwrap();
        assert_eq!(jar.get(USER_DATA_COOKIE).unwrap().http_only(), Some(false));
        assert_eq!(jar.get(REFRESH_COOKIE).unwrap().value(), "r");

        let quiet = CookieConfig {
            user_data: false,
            ..CookieConfig::default()
        };
        let jar = with_session(CookieJar::new(), &quiet, &access, &refresh, &user).unwrap();
        assert!(jar.get(USER_DATA_COOKIE).is_none());
    }
}
