mod configured_platform;
mod membership_lifecycle;
mod payment_cycles;
mod rewards_flow;
