//! Smoke Screen Unit tests for the mapping layer components
//!
//! These tests span the crate, exercising builders, encoders and decoders
//! in isolation from the service scenarios. They mostly cover the
//! happy path plus the invariants each entity enforces.

use chrono::NaiveDate;
use fineract_mapper::{
    Error, ErrorCode, classify,
    client::Client,
    command::{Activation, MemberChange, StaffAssignment, TransferClients, Transition, TransitionCommand},
    config::ClientConfig,
    group::Group,
    office::Office,
    resource::ResourceKind,
    staff::Staff,
    timeline::EventKind,
};
use serde_json::json;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// OFFICE TESTS
mod office_tests {
    use super::*;

    fn head_office_child() -> Office {
        Office::builder()
            .name("Nairobi Branch")
            .parent_id(1)
            .opening_date("01 March 2012")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .external_id("NB-01")
            .build()
            .unwrap()
    }

    /// Test that an office encodes every input field in the expected shape
    #[test]
    fn encodes_all_fields() {
        let payload = head_office_child().to_json().unwrap();

        assert_eq!(
            payload,
            json!({
                "name": "Nairobi Branch",
                "parentId": 1,
                "openingDate": "01 March 2012",
                "dateFormat": "dd MMMM yyyy",
                "locale": "en",
                "externalId": "NB-01"
            })
        );
    }

    /// Test that the builder rejects an office without an opening date
    #[test]
    fn builder_requires_opening_date() {
        let result = Office::builder()
            .name("Branch")
            .parent_id(1)
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build();

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    /// Test that an unparseable date is rejected before the office exists
    #[test]
    fn builder_rejects_unparseable_date() {
        let result = Office::builder()
            .name("Branch")
            .parent_id(1)
            .opening_date("2012-03-01")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build();

        assert_eq!(result.unwrap_err().code(), ErrorCode::InvalidArgument);
    }

    /// Test that external ids longer than 100 characters are rejected
    #[test]
    fn rejects_long_external_id() {
        let result = Office::builder()
            .name("Branch")
            .parent_id(1)
            .opening_date("01 March 2012")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .external_id("x".repeat(101))
            .build();

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    /// Test that a server office response decodes with its read-only fields
    #[test]
    fn decodes_server_response() {
        let office = Office::from_json(&json!({
            "id": 2,
            "name": "Nairobi Branch",
            "nameDecorated": "....Nairobi Branch",
            "openingDate": [2012, 3, 1],
            "hierarchy": ".2.",
            "parentId": 1,
            "parentName": "Head Office"
        }))
        .unwrap();

        assert_eq!(office.id(), Some(2));
        assert_eq!(office.opening_date(), Some(ymd(2012, 3, 1)));
        assert_eq!(office.parent_name(), Some("Head Office"));
        assert_eq!(office.name_decorated(), Some("....Nairobi Branch"));
        assert_eq!(office.external_id(), None);
    }

    /// Test that an office body without a name is rejected even when it
    /// carries an id
    #[test]
    fn decode_requires_name() {
        let result = Office::from_json(&json!({ "id": 7, "nameDecorated": "..Branch" }));
        assert_eq!(result.unwrap_err().code(), ErrorCode::DecodeError);

        let unsaved = Office::from_json(&json!({ "name": "Branch" })).unwrap();
        assert_eq!(unsaved.id(), None);
        assert_eq!(unsaved.name(), "Branch");
    }

    /// Test that the encoded payload decodes back into the same office
    #[test]
    fn round_trips() {
        let office = head_office_child();
        let decoded = Office::from_json(&office.to_json().unwrap()).unwrap();

        assert_eq!(office, decoded);
    }
}

// STAFF TESTS
mod staff_tests {
    use super::*;

    /// Test that booleans are always emitted and absent optionals are not
    #[test]
    fn encodes_booleans_always() {
        let staff = Staff::builder()
            .office_id(1)
            .firstname("Grace")
            .lastname("Otieno")
            .build()
            .unwrap();

        assert_eq!(
            staff.to_json().unwrap(),
            json!({
                "officeId": 1,
                "firstname": "Grace",
                "lastname": "Otieno",
                "isLoanOfficer": false,
                "isActive": true
            })
        );
    }

    /// Test that the joining date, format and locale must travel together
    #[test]
    fn joining_date_requires_format() {
        let result = Staff::builder()
            .office_id(1)
            .firstname("Grace")
            .lastname("Otieno")
            .joining_date("04 May 2019")
            .build();

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    /// Test that a staff response without officeId breaks the contract
    #[test]
    fn decode_requires_office_id() {
        let result = Staff::from_json(&json!({ "id": 3, "firstname": "Grace" }));

        assert_eq!(result.unwrap_err().code(), ErrorCode::DecodeError);
    }

    /// Test that display names fall back to "lastname, firstname"
    #[test]
    fn display_name_falls_back() {
        let staff = Staff::from_json(&json!({
            "id": 3,
            "officeId": 1,
            "firstname": "Grace",
            "lastname": "Otieno",
            "isLoanOfficer": true
        }))
        .unwrap();

        assert_eq!(staff.display_name(), "Otieno, Grace");
        assert!(staff.is_loan_officer());
        assert!(!staff.is_active());
    }
}

// CLIENT TESTS
mod client_tests {
    use super::*;

    /// Test that groupId wins over externalId when both are set
    #[test]
    fn group_id_excludes_external_id() {
        let client = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .group_id(5)
            .external_id("EXT-1")
            .build()
            .unwrap();
        let payload = client.to_json().unwrap();

        assert_eq!(payload["groupId"], json!(5));
        assert!(payload.get("externalId").is_none());
    }

    /// Test that only the highest-priority optional attribute is emitted
    #[test]
    fn later_attributes_are_dropped() {
        let client = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .mobile_no("0700000000")
            .gender_id(22)
            .client_classification_id(4)
            .build()
            .unwrap();

        assert_eq!(
            client.to_json().unwrap(),
            json!({
                "officeId": 1,
                "fullname": "Jane Jones",
                "mobileNo": "0700000000",
                "active": false
            })
        );
    }

    /// Test that a client without any usable name fails to encode
    #[test]
    fn encode_requires_a_name() {
        let nameless = Client::builder().office_id(1).build().unwrap();
        assert_eq!(nameless.to_json().unwrap_err().code(), ErrorCode::InvalidArgument);

        let first_only = Client::builder().office_id(1).firstname("Jane").build().unwrap();
        assert!(matches!(first_only.to_json(), Err(Error::InvalidArgument(_))));
    }

    /// Test that fullname is sent alone and the parts are never mixed in
    #[test]
    fn fullname_is_sent_alone() {
        let client = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .firstname("Ignored")
            .build()
            .unwrap();
        let payload = client.to_json().unwrap();

        assert_eq!(payload["fullname"], json!("Jane Jones"));
        assert!(payload.get("firstname").is_none());
        assert!(payload.get("lastname").is_none());
    }

    /// Test that name parts are emitted with an optional middle name
    #[test]
    fn name_parts_are_sent_together() {
        let client = Client::builder()
            .office_id(1)
            .firstname("Jane")
            .middlename("W")
            .lastname("Jones")
            .build()
            .unwrap();
        let payload = client.to_json().unwrap();

        assert_eq!(payload["firstname"], json!("Jane"));
        assert_eq!(payload["middlename"], json!("W"));
        assert_eq!(payload["lastname"], json!("Jones"));
        assert!(payload.get("fullname").is_none());
    }

    /// Test the name accessors split and join in both directions
    #[test]
    fn name_accessors() {
        let full = Client::builder().office_id(1).fullname("Jane Jones").build().unwrap();
        assert_eq!(full.first_name().as_deref(), Some("Jane"));
        assert_eq!(full.last_name().as_deref(), Some("Jones"));

        let parts = Client::from_json(&json!({
            "officeId": 1,
            "firstname": "Jane",
            "lastname": "Jones"
        }))
        .unwrap();
        assert_eq!(parts.full_name().as_deref(), Some("Jane Jones"));
        assert_eq!(parts.first_name().as_deref(), Some("Jane"));
    }

    /// Test that an active client needs an activation date at build time
    #[test]
    fn active_requires_activation_date() {
        let result = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .active(true)
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build();

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    /// Test that an active client emits its activation date group
    #[test]
    fn active_client_emits_date_group() {
        let client = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .active(true)
            .activation_date("10 December 2014")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build()
            .unwrap();

        assert_eq!(
            client.to_json().unwrap(),
            json!({
                "officeId": 1,
                "fullname": "Jane Jones",
                "active": true,
                "activationDate": "10 December 2014",
                "dateFormat": "dd MMMM yyyy",
                "locale": "en"
            })
        );
    }

    /// Test that an inactive client emits no date fields at all
    #[test]
    fn inactive_client_emits_no_dates() {
        let client = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .activation_date("10 December 2014")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build()
            .unwrap();
        let payload = client.to_json().unwrap();

        assert!(payload.get("activationDate").is_none());
        assert!(payload.get("dateFormat").is_none());
        assert_eq!(payload["active"], json!(false));
    }

    /// Test that a two-digit birth year resolves into the past
    #[test]
    fn two_digit_birth_year_stays_in_the_past() {
        let client = Client::builder()
            .office_id(1)
            .fullname("Jane Jones")
            .date_of_birth("01/03/85")
            .date_format("dd/MM/yy")
            .locale("en")
            .build()
            .unwrap();

        assert_eq!(client.date_of_birth(), Some(ymd(1985, 3, 1)));
    }

    /// Test that building a second client leaves the first untouched
    #[test]
    fn build_does_not_touch_earlier_instances() {
        let first = Client::builder().office_id(1).fullname("Jane Jones").build().unwrap();
        let snapshot = first.clone();
        let _second = Client::builder().office_id(2).fullname("John Doe").build().unwrap();

        assert_eq!(first, snapshot);
        assert_eq!(first.office_id(), 1);
    }

    /// Test decoding a full server response with nested references
    #[test]
    fn decodes_server_response() {
        let client = Client::from_json(&json!({
            "id": 12,
            "accountNo": "000000012",
            "status": { "id": 300, "code": "clientStatusType.active", "value": "Active" },
            "active": true,
            "activationDate": [2014, 12, 1],
            "firstname": "Jane",
            "lastname": "Jones",
            "displayName": "Jane Jones",
            "gender": { "id": 22, "name": "Female" },
            "clientType": { "id": 9, "name": "Corporate" },
            "clientClassification": { "id": 4 },
            "officeId": 1,
            "officeName": "Head Office",
            "groups": [{ "id": 5 }, { "id": 6 }],
            "timeline": {
                "submittedOnDate": [2014, 11, 30],
                "submittedByUsername": "mifos",
                "activatedOnDate": [2014, 12, 10],
                "activatedByUsername": "mifos",
                "activatedByFirstname": "App",
                "activatedByLastname": "Administrator"
            }
        }))
        .unwrap();

        assert_eq!(client.id(), Some(12));
        assert_eq!(client.account_no(), Some("000000012"));
        assert_eq!(client.gender_id(), Some(22));
        assert_eq!(client.client_type_id(), Some(9));
        assert_eq!(client.client_type().and_then(|t| t.name.as_deref()), Some("Corporate"));
        assert_eq!(client.client_classification_id(), Some(4));
        assert_eq!(client.status().and_then(|s| s.name.as_deref()), Some("Active"));
        assert_eq!(client.group_ids(), &[5, 6]);
        assert_eq!(client.office_name(), Some("Head Office"));
        // the timeline wins over the flat activationDate
        assert_eq!(client.activation_date(), Some(ymd(2014, 12, 10)));
        let timeline = client.timeline().unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(
            timeline.get(EventKind::Activated).unwrap().actor_last_name.as_deref(),
            Some("Administrator")
        );
    }

    /// Test that clientId takes precedence over id
    #[test]
    fn client_id_wins_over_id() {
        let client = Client::from_json(&json!({ "officeId": 1, "clientId": 7, "id": 8 })).unwrap();

        assert_eq!(client.id(), Some(7));
    }

    /// Test that a flat clientTypeId is read when no nested object exists
    #[test]
    fn flat_reference_ids_are_read() {
        let client = Client::from_json(&json!({
            "officeId": 1,
            "clientTypeId": 9,
            "genderId": 22
        }))
        .unwrap();

        assert_eq!(client.client_type_id(), Some(9));
        assert_eq!(client.gender_id(), Some(22));
        assert_eq!(client.client_type(), None);
    }

    /// Test that a malformed timeline date fails the whole decode
    #[test]
    fn malformed_timeline_fails_decode() {
        let result = Client::from_json(&json!({
            "officeId": 1,
            "timeline": { "activatedOnDate": [2014, 13, 10] }
        }));

        assert!(matches!(result, Err(Error::Decode(_))));
    }
}

// GROUP TESTS
mod group_tests {
    use super::*;

    /// Test that a group payload carries its members as ids
    #[test]
    fn encodes_members() {
        let group = Group::builder()
            .office_id(1)
            .name("Umoja")
            .staff_id(3)
            .client_members([10, 11])
            .build()
            .unwrap();

        assert_eq!(
            group.to_json().unwrap(),
            json!({
                "officeId": 1,
                "name": "Umoja",
                "staffId": 3,
                "active": false,
                "clientMembers": [10, 11]
            })
        );
    }

    /// Test that an active group without an activation date cannot be built
    #[test]
    fn active_requires_activation_date() {
        let result = Group::builder().office_id(1).name("Umoja").active(true).build();

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    /// Test that activation is read from the timeline when one is decoded
    #[test]
    fn activation_prefers_timeline() {
        let group = Group::from_json(&json!({
            "id": 4,
            "officeId": 1,
            "name": "Umoja",
            "active": true,
            "activationDate": [2015, 1, 1],
            "timeline": { "activatedOnDate": [2015, 2, 2] },
            "clientMembers": [
                { "id": 10, "officeId": 1, "displayName": "Jane Jones" },
                { "id": 11, "officeId": 1, "displayName": "John Doe" }
            ]
        }))
        .unwrap();

        assert_eq!(group.activation_date(), Some(ymd(2015, 2, 2)));
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.members()[1].display_name(), Some("John Doe"));
        assert!(group.client_members().is_empty());
    }

    /// Test that without a timeline the input activation date is used
    #[test]
    fn activation_falls_back_to_input() {
        let group = Group::builder()
            .office_id(1)
            .name("Umoja")
            .active(true)
            .activation_date("02 February 2015")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build()
            .unwrap();

        assert_eq!(group.activation_date(), Some(ymd(2015, 2, 2)));
    }
}

// COMMAND TESTS
mod command_tests {
    use super::*;

    /// Test that transfers need at least one client
    #[test]
    fn transfer_requires_clients() {
        let result = TransferClients::builder().destination_group_id(9).build();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    /// Test the transfer payload shape
    #[test]
    fn transfer_payload() {
        let transfer = TransferClients::builder()
            .destination_group_id(9)
            .clients([10, 11])
            .inherit_destination_group_loan_officer(true)
            .build()
            .unwrap();

        assert_eq!(
            transfer.to_json().unwrap(),
            json!({
                "destinationGroupId": 9,
                "clients": [{ "id": 10 }, { "id": 11 }],
                "inheritDestinationGroupLoanOfficer": true
            })
        );
    }

    /// Test the close payload uses the closure keys
    #[test]
    fn close_payload() {
        let close = TransitionCommand::builder(Transition::Close)
            .date("05 June 2020")
            .reason_id(17)
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build()
            .unwrap();

        assert_eq!(
            close.to_json().unwrap(),
            json!({
                "closureDate": "05 June 2020",
                "dateFormat": "dd MMMM yyyy",
                "locale": "en",
                "closureReasonId": 17
            })
        );
    }

    /// Test that a reject command needs its reason
    #[test]
    fn reject_requires_reason() {
        let result = TransitionCommand::builder(Transition::Reject)
            .date("05 June 2020")
            .date_format("dd MMMM yyyy")
            .locale("en")
            .build();

        assert!(matches!(result, Err(Error::InvalidArgument(msg)) if msg.contains("rejectionReasonId")));
    }

    /// Test activation and the small single-field commands
    #[test]
    fn simple_commands() {
        let activation = Activation::builder()
            .activation_date("10/12/2014")
            .date_format("dd/MM/yyyy")
            .locale("en")
            .build()
            .unwrap();
        assert_eq!(activation.date(), ymd(2014, 12, 10));
        assert_eq!(activation.to_json().unwrap()["activationDate"], json!("10/12/2014"));

        assert_eq!(StaffAssignment::new(3).to_json().unwrap(), json!({ "staffId": 3 }));
        assert_eq!(
            MemberChange::new([10]).unwrap().to_json().unwrap(),
            json!({ "clientMembers": [10] })
        );
        assert!(MemberChange::new(Vec::new()).is_err());
    }
}

// ERROR CODE TESTS
mod error_tests {
    use super::*;

    /// Test that each code keeps its fixed number
    #[test]
    fn codes_are_fixed() {
        assert_eq!(ErrorCode::NotConnected.code(), 1);
        assert_eq!(ErrorCode::InvalidAuthToken.code(), 2);
        assert_eq!(ErrorCode::ClientNotFound.code(), 100);
        assert_eq!(ErrorCode::StaffNotFound.code(), 103);
        assert_eq!(ErrorCode::Unknown.code(), 999);
        assert_eq!(ErrorCode::GroupNotFound.message(), "Group not found");
    }

    /// Test that every resource kind has its own not-found code and no
    /// other code sits in that range
    #[test]
    fn not_found_codes_cover_each_kind() {
        let codes: Vec<u16> = [
            ResourceKind::Client,
            ResourceKind::Group,
            ResourceKind::Office,
            ResourceKind::Staff,
        ]
        .into_iter()
        .map(|kind| classify::not_found(kind).code())
        .collect();

        assert_eq!(codes, vec![100, 101, 102, 103]);
    }

    /// Test that errors report the matching code
    #[test]
    fn errors_map_to_codes() {
        let validation = Error::ResourceValidation {
            message: "duplicate external id".into(),
        };
        assert_eq!(validation.code(), ErrorCode::ResourceValidation);
        assert_eq!(validation.to_string(), "Validation failed: duplicate external id");
        assert_eq!(Error::Api(ErrorCode::OfficeNotFound).code(), ErrorCode::OfficeNotFound);
    }
}

// CONFIG TESTS
mod config_tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    /// Test that defaults apply when only the base url is set
    #[test]
    fn defaults_apply() {
        let vars = HashMap::from([("FINERACT_BASE_URL", "https://demo.example/api/v1/")]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.base_url, "https://demo.example/api/v1");
        assert_eq!(config.tenant_id, "default");
        assert_eq!(config.auth_token, None);
        assert_eq!(config.date_format().pattern, "dd MMMM yyyy");
        assert_eq!(config.date_format().locale, "en");
    }

    /// Test that a missing base url is an error
    #[test]
    fn base_url_is_required() {
        assert!(ClientConfig::from_lookup(|_| None).is_err());
    }

    /// Test loading settings from a dotenv file
    #[test]
    fn reads_env_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "FINERACT_BASE_URL=https://demo.example/api/v1")?;
        writeln!(file, "FINERACT_TENANT_ID=kenya")?;
        writeln!(file, "FINERACT_AUTH_TOKEN=bWlmb3M6cGFzc3dvcmQ=")?;
        writeln!(file, "FINERACT_LOCALE=fr")?;

        let config = ClientConfig::from_env_file(file.path())?;

        assert_eq!(config.tenant_id, "kenya");
        assert_eq!(config.auth_token.as_deref(), Some("bWlmb3M6cGFzc3dvcmQ="));
        assert_eq!(config.date_format().locale, "fr");
        Ok(())
    }
}
