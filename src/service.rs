//! Service layer API: one forwarder per platform operation
use super::classify::{Endpoint, Failure, classify};
use super::client::Client;
use super::command::{Activation, MemberChange, StaffAssignment, TransferClients, Transition, TransitionCommand};
use super::config::ClientConfig;
use super::error::{Error, Result};
use super::group::Group;
use super::json::Fields;
use super::office::Office;
use super::resource::{CommandResult, Page, ResourceKind};
use super::staff::Staff;
use super::transport::{Method, Request, Transport};
use chrono::NaiveDate;
use serde_json::{Value, json};

const TENANT_HEADER: &str = "Fineract-Platform-TenantId";

pub struct FineractService<T: Transport> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> FineractService<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and return the parsed JSON body of a 2xx response
    fn send(&self, endpoint: Endpoint, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}/{}", self.config.base_url, path.trim_start_matches('/'));
        tracing::info!(?method, %url, "sending request");

        let mut request = Request::new(method, url)
            .header(TENANT_HEADER, self.config.tenant_id.as_str())
            .header("Content-Type", "application/json");
        if let Some(token) = &self.config.auth_token {
            request = request.header("Authorization", format!("Basic {token}"));
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(e) => return Err(classify(endpoint, &Failure::NoResponse(e.0))),
        };
        if !response.is_success() {
            return Err(classify(
                endpoint,
                &Failure::Status {
                    status: response.status,
                    body: response.body,
                },
            ));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| classify(endpoint, &Failure::MalformedBody(e.to_string())))
    }

    fn command(&self, kind: ResourceKind, method: Method, path: &str, body: Value) -> Result<CommandResult> {
        let value = self.send(Endpoint::Resource(kind), method, path, Some(body))?;
        CommandResult::from_json(kind, &value)
    }

    fn fetch(&self, kind: ResourceKind, path: &str) -> Result<Value> {
        self.send(Endpoint::Resource(kind), Method::Get, path, None)
    }

    /// Log in and return the key to use as the `Authorization` token
    pub fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let value = self.send(
            Endpoint::Authentication,
            Method::Post,
            "authentication",
            Some(json!({ "username": username, "password": password })),
        )?;
        Fields::new(&value)?.require_str("base64EncodedAuthenticationKey")
    }

    // Offices

    pub fn create_office(&self, office: &Office) -> Result<CommandResult> {
        self.command(ResourceKind::Office, Method::Post, "offices", office.to_json()?)
    }

    pub fn retrieve_office(&self, office_id: i64) -> Result<Office> {
        Office::from_json(&self.fetch(ResourceKind::Office, &format!("offices/{office_id}"))?)
    }

    pub fn list_offices(&self) -> Result<Page<Office>> {
        Page::from_json(&self.fetch(ResourceKind::Office, "offices")?, Office::from_json)
    }

    // Staff

    pub fn create_staff(&self, staff: &Staff) -> Result<CommandResult> {
        self.command(ResourceKind::Staff, Method::Post, "staff", staff.to_json()?)
    }

    pub fn retrieve_staff(&self, staff_id: i64) -> Result<Staff> {
        Staff::from_json(&self.fetch(ResourceKind::Staff, &format!("staff/{staff_id}"))?)
    }

    pub fn list_staff(&self) -> Result<Page<Staff>> {
        Page::from_json(&self.fetch(ResourceKind::Staff, "staff")?, Staff::from_json)
    }

    // Clients

    pub fn create_client(&self, client: &Client) -> Result<CommandResult> {
        self.command(ResourceKind::Client, Method::Post, "clients", client.to_json()?)
    }

    pub fn retrieve_client(&self, client_id: i64) -> Result<Client> {
        Client::from_json(&self.fetch(ResourceKind::Client, &format!("clients/{client_id}"))?)
    }

    pub fn list_clients(&self) -> Result<Page<Client>> {
        Page::from_json(&self.fetch(ResourceKind::Client, "clients")?, Client::from_json)
    }

    pub fn activate_client(&self, client_id: i64, activation: &Activation) -> Result<CommandResult> {
        let path = format!("clients/{client_id}?command=activate");
        self.command(ResourceKind::Client, Method::Post, &path, activation.to_json()?)
    }

    /// Activate on `date`, sent in the configured date format.
    pub fn activate_client_on(&self, client_id: i64, date: NaiveDate) -> Result<CommandResult> {
        let activation = Activation::on(date, self.config.date_format().clone());
        self.activate_client(client_id, &activation)
    }

    pub fn close_client(&self, client_id: i64, command: &TransitionCommand) -> Result<CommandResult> {
        self.client_transition(client_id, Transition::Close, command)
    }

    pub fn reject_client(&self, client_id: i64, command: &TransitionCommand) -> Result<CommandResult> {
        self.client_transition(client_id, Transition::Reject, command)
    }

    pub fn withdraw_client(&self, client_id: i64, command: &TransitionCommand) -> Result<CommandResult> {
        self.client_transition(client_id, Transition::Withdraw, command)
    }

    fn client_transition(
        &self,
        client_id: i64,
        expected: Transition,
        command: &TransitionCommand,
    ) -> Result<CommandResult> {
        ensure_transition(expected, command)?;
        let path = format!("clients/{client_id}?command={}", expected.command());
        self.command(ResourceKind::Client, Method::Post, &path, command.to_json()?)
    }

    pub fn assign_client_staff(&self, client_id: i64, assignment: &StaffAssignment) -> Result<CommandResult> {
        let path = format!("clients/{client_id}?command=assignStaff");
        self.command(ResourceKind::Client, Method::Post, &path, assignment.to_json()?)
    }

    pub fn unassign_client_staff(&self, client_id: i64, assignment: &StaffAssignment) -> Result<CommandResult> {
        let path = format!("clients/{client_id}?command=unassignStaff");
        self.command(ResourceKind::Client, Method::Post, &path, assignment.to_json()?)
    }

    // Groups

    pub fn create_group(&self, group: &Group) -> Result<CommandResult> {
        self.command(ResourceKind::Group, Method::Post, "groups", group.to_json()?)
    }

    pub fn retrieve_group(&self, group_id: i64) -> Result<Group> {
        let path = format!("groups/{group_id}?associations=clientMembers");
        Group::from_json(&self.fetch(ResourceKind::Group, &path)?)
    }

    pub fn list_groups(&self) -> Result<Page<Group>> {
        Page::from_json(&self.fetch(ResourceKind::Group, "groups")?, Group::from_json)
    }

    pub fn activate_group(&self, group_id: i64, activation: &Activation) -> Result<CommandResult> {
        let path = format!("groups/{group_id}?command=activate");
        self.command(ResourceKind::Group, Method::Post, &path, activation.to_json()?)
    }

    pub fn activate_group_on(&self, group_id: i64, date: NaiveDate) -> Result<CommandResult> {
        let activation = Activation::on(date, self.config.date_format().clone());
        self.activate_group(group_id, &activation)
    }

    pub fn close_group(&self, group_id: i64, command: &TransitionCommand) -> Result<CommandResult> {
        ensure_transition(Transition::Close, command)?;
        let path = format!("groups/{group_id}?command=close");
        self.command(ResourceKind::Group, Method::Post, &path, command.to_json()?)
    }

    pub fn associate_clients(&self, group_id: i64, change: &MemberChange) -> Result<CommandResult> {
        let path = format!("groups/{group_id}?command=associateClients");
        self.command(ResourceKind::Group, Method::Post, &path, change.to_json()?)
    }

    pub fn disassociate_clients(&self, group_id: i64, change: &MemberChange) -> Result<CommandResult> {
        let path = format!("groups/{group_id}?command=disassociateClients");
        self.command(ResourceKind::Group, Method::Post, &path, change.to_json()?)
    }

    pub fn transfer_clients(&self, group_id: i64, transfer: &TransferClients) -> Result<CommandResult> {
        let path = format!("groups/{group_id}?command=transferClients");
        self.command(ResourceKind::Group, Method::Post, &path, transfer.to_json()?)
    }

    pub fn assign_group_staff(&self, group_id: i64, assignment: &StaffAssignment) -> Result<CommandResult> {
        let path = format!("groups/{group_id}?command=assignStaff");
        self.command(ResourceKind::Group, Method::Post, &path, assignment.to_json()?)
    }

    pub fn unassign_group_staff(&self, group_id: i64, assignment: &StaffAssignment) -> Result<CommandResult> {
        let path = format!("groups/{group_id}?command=unassignStaff");
        self.command(ResourceKind::Group, Method::Post, &path, assignment.to_json()?)
    }
}

fn ensure_transition(expected: Transition, command: &TransitionCommand) -> Result<()> {
    if command.transition() != expected {
        return Err(Error::InvalidArgument(format!(
            "expected a {:?} command, got {:?}",
            expected,
            command.transition()
        )));
    }
    Ok(())
}
