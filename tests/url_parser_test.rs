//! Tests for SharePoint site URL parsing.

use sharepoint_drive::url_parser::{parse_site_url, SiteAddress};
use sharepoint_drive::SiteCollection;

mod sites_urls {
    use super::*;

    #[test]
    fn basic_site_url() {
        let address = parse_site_url("https://contoso.sharepoint.com/sites/Marketing").unwrap();
        assert_eq!(
            address,
            SiteAddress {
                hostname: "contoso.sharepoint.com".to_string(),
                collection: SiteCollection::Sites,
                site_name: "Marketing".to_string(),
            }
        );
    }

    #[test]
    fn site_url_with_trailing_slash() {
        let address = parse_site_url("https://contoso.sharepoint.com/sites/Marketing/").unwrap();
        assert_eq!(address.site_name, "Marketing");
    }

    #[test]
    fn site_url_with_query_params() {
        let address =
            parse_site_url("https://contoso.sharepoint.com/sites/Marketing?web=1").unwrap();
        assert_eq!(address.site_name, "Marketing");
    }

    #[test]
    fn site_url_http() {
        let address = parse_site_url("http://intranet.example.com/sites/HR").unwrap();
        assert_eq!(address.hostname, "intranet.example.com");
        assert_eq!(address.site_name, "HR");
    }
}

mod teams_urls {
    use super::*;

    #[test]
    fn team_site_url() {
        let address = parse_site_url("https://contoso.sharepoint.com/teams/Engineering").unwrap();
        assert_eq!(address.hostname, "contoso.sharepoint.com");
        assert_eq!(address.collection, SiteCollection::Teams);
        assert_eq!(address.site_name, "Engineering");
    }

    #[test]
    fn team_site_url_with_library_path() {
        let address =
            parse_site_url("https://contoso.sharepoint.com/teams/Ops/Shared%20Documents").unwrap();
        assert_eq!(address.collection, SiteCollection::Teams);
        assert_eq!(address.site_name, "Ops");
    }
}

mod invalid_urls {
    use super::*;

    #[test]
    fn root_url_without_site() {
        assert!(parse_site_url("https://contoso.sharepoint.com").is_err());
    }

    #[test]
    fn personal_onedrive_url() {
        assert!(parse_site_url("https://contoso-my.sharepoint.com/personal/jdoe").is_err());
    }

    #[test]
    fn non_url_input() {
        assert!(parse_site_url("Marketing").is_err());
        assert!(parse_site_url("   ").is_err());
    }

    #[test]
    fn error_names_input() {
        let err = parse_site_url("not-a-site").unwrap_err();
        assert!(format!("{}", err).contains("not-a-site"));
    }
}
