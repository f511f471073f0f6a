use label_policy::LabelPolicy;

pub(crate) struct ApiServerState {
    pub(crate) policy: LabelPolicy,
}
